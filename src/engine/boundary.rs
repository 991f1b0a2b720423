//! Locate the observed -> predicted transition ("today") in a merged sequence.

use crate::domain::MergedPoint;

/// Index of the first forecast-only point.
///
/// Falls back to the last index when the sequence never transitions (all
/// observed, or all predicted). Returns `None` only for an empty sequence.
pub fn locate_pivot(points: &[MergedPoint]) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    let pivot = points
        .iter()
        .position(MergedPoint::is_forecast_only)
        .unwrap_or(points.len() - 1);
    Some(pivot)
}
