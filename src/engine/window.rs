//! Windowing around the pivot, driven by the history/prediction magnitudes.

use std::ops::Range;

use crate::domain::{DAYS_PER_MONTH, MergedPoint, WindowSpec};

/// Compute the visible index range `[start, end)`.
///
/// `start = max(0, pivot - h*30)`, `end = min(len, pivot + p*30)`, with `start`
/// clamped to `end` so the range is always well-formed even for a pivot past
/// the end of the sequence.
pub fn window_range(len: usize, pivot: usize, history_months: u32, prediction_months: u32) -> Range<usize> {
    let back = (history_months as usize).saturating_mul(DAYS_PER_MONTH);
    let ahead = (prediction_months as usize).saturating_mul(DAYS_PER_MONTH);

    let end = pivot.saturating_add(ahead).min(len);
    let start = pivot.saturating_sub(back).min(end);
    start..end
}

/// Visible sub-sequence for the given window.
///
/// An undefined pivot (empty sequence) yields an empty slice.
pub fn slice_window<'a>(points: &'a [MergedPoint], pivot: Option<usize>, spec: &WindowSpec) -> &'a [MergedPoint] {
    let Some(pivot) = pivot else {
        return &[];
    };
    let range = window_range(
        points.len(),
        pivot,
        spec.history_months(),
        spec.prediction_months(),
    );
    tracing::trace!(
        start = range.start,
        end = range.end,
        history = spec.history_months(),
        prediction = spec.prediction_months(),
        "window"
    );
    &points[range]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use chrono::{Duration, NaiveDate};

    fn daily(n: usize) -> Vec<MergedPoint> {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| MergedPoint {
                date: d0 + Duration::days(i as i64),
                observed: Some(i as f64),
                predicted: None,
            })
            .collect()
    }

    #[test]
    fn clamps_start_at_zero() {
        assert_eq!(window_range(400, 10, 3, 1), 0..40);
    }

    #[test]
    fn clamps_end_at_len() {
        assert_eq!(window_range(100, 90, 1, 12), 60..100);
    }

    #[test]
    fn interior_window_is_exact() {
        assert_eq!(window_range(2000, 1000, 12, 6), 640..1180);
    }

    #[test]
    fn pivot_past_end_stays_well_formed() {
        let r = window_range(5, 500, 3, 1);
        assert!(r.start <= r.end);
        assert_eq!(r.end, 5);
    }

    #[test]
    fn extreme_magnitudes_do_not_overflow() {
        let r = window_range(10, usize::MAX - 1, u32::MAX, u32::MAX);
        assert_eq!(r, 10..10);
    }

    #[test]
    fn slice_is_pure() {
        let points = daily(500);
        let spec = WindowSpec::new(Domain::Interest, 3, 1);
        let a = slice_window(&points, Some(200), &spec);
        let b = slice_window(&points, Some(200), &spec);
        assert_eq!(a, b);
        assert_eq!(a.len(), 120);
        assert_eq!(a[0].observed, Some(110.0));
    }

    #[test]
    fn undefined_pivot_is_empty() {
        let points = daily(3);
        let spec = Domain::Interest.default_window();
        assert!(slice_window(&points, None, &spec).is_empty());
    }
}
