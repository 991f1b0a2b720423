//! Series merging: observed + predicted -> one date-ordered sequence.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{InterestRow, MergedPoint, ObservedPoint, PredictedPoint};

/// Merge observed and predicted points over the union of their dates.
///
/// Each side is looked up independently per date, so a date missing from one
/// input yields `None` on that side. Duplicate dates within one input keep the
/// first occurrence. Output is strictly ordered by date.
pub fn merge_series(observed: &[ObservedPoint], predicted: &[PredictedPoint]) -> Vec<MergedPoint> {
    let mut by_date: BTreeMap<NaiveDate, MergedPoint> = BTreeMap::new();

    for p in observed {
        let slot = by_date.entry(p.date).or_insert_with(|| empty_point(p.date));
        slot.observed.get_or_insert(p.value);
    }
    for p in predicted {
        let slot = by_date.entry(p.date).or_insert_with(|| empty_point(p.date));
        slot.predicted.get_or_insert(p.value);
    }

    let out: Vec<MergedPoint> = by_date.into_values().collect();
    tracing::trace!(
        observed = observed.len(),
        predicted = predicted.len(),
        merged = out.len(),
        "merged price series"
    );
    out
}

/// Pass interest rows through, enforcing "exactly one side per day".
///
/// - a row with both sides keeps only the observed value (the day is historical)
/// - a row with neither side is dropped
/// - duplicate dates keep the first row; output is strictly ordered by date
pub fn merge_interest(rows: &[InterestRow]) -> Vec<MergedPoint> {
    let mut by_date: BTreeMap<NaiveDate, MergedPoint> = BTreeMap::new();
    let mut both = 0usize;
    let mut neither = 0usize;

    for row in rows {
        let point = match (row.actual, row.predicted) {
            (Some(actual), Some(_)) => {
                both += 1;
                MergedPoint {
                    date: row.date,
                    observed: Some(actual),
                    predicted: None,
                }
            }
            (Some(actual), None) => MergedPoint {
                date: row.date,
                observed: Some(actual),
                predicted: None,
            },
            (None, Some(predicted)) => MergedPoint {
                date: row.date,
                observed: None,
                predicted: Some(predicted),
            },
            (None, None) => {
                neither += 1;
                continue;
            }
        };
        by_date.entry(row.date).or_insert(point);
    }

    if both > 0 || neither > 0 {
        tracing::debug!(both, neither, "normalized interest rows");
    }

    by_date.into_values().collect()
}

fn empty_point(date: NaiveDate) -> MergedPoint {
    MergedPoint {
        date,
        observed: None,
        predicted: None,
    }
}
