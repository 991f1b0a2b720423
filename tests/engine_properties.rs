use chrono::{Duration, NaiveDate};
use plot_pulse::domain::{
    Confidence, Domain, Insight, InterestRow, MergedPoint, ObservedPoint, PredictedPoint, TrendDirection,
    WindowSpec,
};
use plot_pulse::engine::{derive_interest, derive_price, locate_pivot, merge_interest, merge_series, window_range};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

const MIN_PROPTEST_CASES: u32 = 256;

fn proptest_cases() -> u32 {
    std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .map(|parsed| parsed.max(MIN_PROPTEST_CASES))
        .unwrap_or(MIN_PROPTEST_CASES)
}

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn day(offset: i64) -> NaiveDate {
    base() + Duration::days(offset)
}

fn observed_points(raw: &[(i64, f64)]) -> Vec<ObservedPoint> {
    raw.iter()
        .map(|&(d, value)| ObservedPoint { date: day(d), value })
        .collect()
}

fn predicted_points(raw: &[(i64, f64)]) -> Vec<PredictedPoint> {
    raw.iter()
        .map(|&(d, value)| PredictedPoint { date: day(d), value })
        .collect()
}

/// History on days `0..h`, forecast-only on days `h..h+f`.
fn contiguous_interest(h: usize, f: usize) -> Vec<MergedPoint> {
    (0..h + f)
        .map(|i| MergedPoint {
            date: day(i as i64),
            observed: (i < h).then_some(i as f64),
            predicted: (i >= h).then_some(i as f64),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        ..ProptestConfig::default()
    })]

    #[test]
    fn merge_covers_date_union_in_order(
        obs in prop::collection::vec((0i64..90, 0.0f64..500.0), 0..40),
        pred in prop::collection::vec((0i64..90, 0.0f64..500.0), 0..40),
    ) {
        let merged = merge_series(&observed_points(&obs), &predicted_points(&pred));

        let mut dates: Vec<i64> = obs.iter().chain(pred.iter()).map(|&(d, _)| d).collect();
        dates.sort_unstable();
        dates.dedup();
        prop_assert_eq!(merged.len(), dates.len());

        for pair in merged.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
        for point in &merged {
            prop_assert!(point.observed.is_some() || point.predicted.is_some());
        }
    }

    #[test]
    fn merge_keeps_first_duplicate(
        first in 0.0f64..100.0,
        second in 100.0f64..200.0,
        d in 0i64..30,
    ) {
        let merged = merge_series(&observed_points(&[(d, first), (d, second)]), &[]);
        prop_assert_eq!(merged.len(), 1);
        prop_assert_eq!(merged[0].observed, Some(first));
    }

    #[test]
    fn interest_rows_have_exactly_one_side(
        rows in prop::collection::vec(
            (0i64..120, prop::option::of(0.0f64..100.0), prop::option::of(0.0f64..100.0)),
            0..60,
        ),
    ) {
        let rows: Vec<InterestRow> = rows
            .into_iter()
            .map(|(d, actual, predicted)| InterestRow { date: day(d), actual, predicted })
            .collect();
        let merged = merge_interest(&rows);
        for point in &merged {
            prop_assert!(point.observed.is_some() != point.predicted.is_some());
        }
        for pair in merged.windows(2) {
            prop_assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn pivot_is_stable_and_in_bounds(
        obs in prop::collection::vec((0i64..90, 0.0f64..500.0), 0..40),
        pred in prop::collection::vec((0i64..90, 0.0f64..500.0), 0..40),
    ) {
        let merged = merge_series(&observed_points(&obs), &predicted_points(&pred));
        let pivot = locate_pivot(&merged);
        prop_assert_eq!(pivot, locate_pivot(&merged));
        match pivot {
            None => prop_assert!(merged.is_empty()),
            Some(i) => {
                prop_assert!(i < merged.len());
                prop_assert!(merged[..i].iter().all(|p| !p.is_forecast_only()));
            }
        }
    }

    #[test]
    fn window_stays_inside_sequence(
        len in 0usize..2000,
        pivot in 0usize..2500,
        h in 0u32..60,
        p in 0u32..20,
    ) {
        let range = window_range(len, pivot, h, p);
        prop_assert!(range.start <= range.end);
        prop_assert!(range.end <= len);
    }

    #[test]
    fn window_widens_with_magnitudes(
        len in 1usize..2000,
        pivot_frac in 0.0f64..1.0,
        h in 3u32..48,
        p in 1u32..12,
    ) {
        let pivot = ((len - 1) as f64 * pivot_frac) as usize;
        let narrow = window_range(len, pivot, h, p);
        let wider_history = window_range(len, pivot, h + 1, p);
        let wider_prediction = window_range(len, pivot, h, p + 1);
        prop_assert!(wider_history.len() >= narrow.len());
        prop_assert!(wider_prediction.len() >= narrow.len());
        prop_assert!(wider_history.start <= narrow.start);
        prop_assert!(wider_prediction.end >= narrow.end);
    }

    #[test]
    fn insight_ordering_holds(
        history in prop::collection::vec((0i64..60, -1000.0f64..1000.0), 1..50),
        forecast in prop::collection::vec((60i64..120, -1000.0f64..1000.0), 0..30),
    ) {
        let history = observed_points(&history);
        let forecast = predicted_points(&forecast);
        let insight = derive_price(&history, &forecast, None);
        let summary = insight.summary().expect("non-empty history is summarized");
        prop_assert!(summary.peak >= summary.average);
        prop_assert!(summary.average >= summary.lowest_value);
        prop_assert_eq!(summary.next_dip.is_some(), !forecast.is_empty());
        if let Some(dip) = summary.next_dip {
            prop_assert!(forecast.iter().all(|p| p.value >= dip.value));
        }
    }
}

#[test]
fn year_of_history_with_ten_forecast_days() {
    // 390 observed days then 10 forecast-only days.
    let merged = contiguous_interest(390, 10);
    let pivot = locate_pivot(&merged);
    assert_eq!(pivot, Some(390));

    let range = window_range(merged.len(), 390, 10, 3);
    assert_eq!(range, 90..400);

    let spec = WindowSpec::new(Domain::Interest, 12, 6);
    let range = window_range(merged.len(), 390, spec.history_months(), spec.prediction_months());
    assert_eq!(range, 30..400);
}

#[test]
fn history_only_pivots_on_last_point() {
    let merged = contiguous_interest(5, 0);
    assert_eq!(locate_pivot(&merged), Some(4));
}

#[test]
fn empty_payload_is_unavailable_everywhere() {
    assert_eq!(locate_pivot(&merge_series(&[], &[])), None);
    assert_eq!(derive_interest(&[], None), Insight::Unavailable);
    assert_eq!(derive_price(&[], &[], Some(10.0)), Insight::Unavailable);
}

#[test]
fn interest_trend_prefers_upstream_value() {
    let merged = contiguous_interest(3, 3);
    let insight = derive_interest(&merged, Some(TrendDirection::Falling));
    let summary = insight.summary().unwrap();
    assert_eq!(summary.trend, TrendDirection::Falling);
    assert_eq!(summary.confidence, Confidence::ModelBased);

    let derived = derive_interest(&merged, None);
    assert_eq!(derived.summary().unwrap().trend, TrendDirection::Rising);
}
