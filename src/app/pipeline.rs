//! Shared "payload -> view" logic used by both CLI and TUI front-ends.
//!
//! payload -> merge -> pivot, and independently payload -> insights.
//! Windowing is applied on demand via `ForecastView::window`, so the CLI and the
//! TUI can re-slice on every slider change without keeping derived state.

use crate::domain::{Domain, Insight, MergedPoint, Payload, Sale, WindowSpec};
use crate::engine::{
    derive_interest, derive_price, locate_pivot, merge_interest, merge_series, slice_window, window_range,
};

/// Everything derived from one payload.
#[derive(Debug, Clone)]
pub struct ForecastView {
    pub domain: Domain,
    pub title: String,
    pub source: Option<String>,
    pub merged: Vec<MergedPoint>,
    pub pivot: Option<usize>,
    pub insight: Insight,
    pub sales: Vec<Sale>,
}

impl ForecastView {
    pub fn from_payload(payload: &Payload) -> Self {
        let title = payload.title();
        match payload {
            Payload::Interest(p) => {
                let merged = merge_interest(&p.graph_data);
                let pivot = locate_pivot(&merged);
                let trend = p.stats.as_ref().and_then(|s| s.prediction_trend);
                let insight = derive_interest(&merged, trend);
                tracing::debug!(points = merged.len(), ?pivot, "built interest view");
                ForecastView {
                    domain: Domain::Interest,
                    title,
                    source: p.source.clone(),
                    merged,
                    pivot,
                    insight,
                    sales: Vec::new(),
                }
            }
            Payload::Price(p) => {
                let observed = p.observed();
                let predicted = p.predicted();
                let merged = merge_series(&observed, &predicted);
                let pivot = locate_pivot(&merged);
                let insight = derive_price(&observed, &predicted, p.current_price);
                tracing::debug!(points = merged.len(), ?pivot, "built price view");
                ForecastView {
                    domain: Domain::Price,
                    title,
                    source: p
                        .product
                        .as_ref()
                        .and_then(|prod| prod.site.as_ref())
                        .map(|site| format!("Live pricing from {}", site.to_uppercase())),
                    merged,
                    pivot,
                    insight,
                    sales: p.sales.clone(),
                }
            }
        }
    }

    /// Visible points for the current window magnitudes.
    pub fn window(&self, spec: &WindowSpec) -> &[MergedPoint] {
        slice_window(&self.merged, self.pivot, spec)
    }

    /// Position of the pivot inside the window returned for `spec`, if visible.
    pub fn pivot_in_window(&self, spec: &WindowSpec) -> Option<usize> {
        let pivot = self.pivot?;
        let range = window_range(
            self.merged.len(),
            pivot,
            spec.history_months(),
            spec.prediction_months(),
        );
        range.contains(&pivot).then(|| pivot - range.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InterestPayload, InterestRow, InterestStats, PricePayload, PricePoint, TrendDirection};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn price_view_matches_reference_scenario() {
        let payload = Payload::Price(PricePayload {
            history: vec![
                PricePoint { date: d(1), price: 100.0 },
                PricePoint { date: d(2), price: 150.0 },
            ],
            forecast: vec![
                PricePoint { date: d(3), price: 200.0 },
                PricePoint { date: d(4), price: 50.0 },
            ],
            current_price: Some(150.0),
            ..PricePayload::default()
        });
        let view = ForecastView::from_payload(&payload);
        assert_eq!(view.merged.len(), 4);
        assert_eq!(view.pivot, Some(2));
        let dip = view.insight.summary().and_then(|s| s.next_dip).unwrap();
        assert_eq!((dip.date, dip.value), (d(4), 50.0));

        let spec = Domain::Price.default_window();
        assert_eq!(view.window(&spec).len(), 4);
        assert_eq!(view.pivot_in_window(&spec), Some(2));
    }

    #[test]
    fn empty_payload_gives_empty_view() {
        let view = ForecastView::from_payload(&Payload::Interest(InterestPayload::default()));
        assert!(view.merged.is_empty());
        assert_eq!(view.pivot, None);
        assert_eq!(view.insight, Insight::Unavailable);
        assert!(view.window(&Domain::Interest.default_window()).is_empty());
        assert_eq!(view.pivot_in_window(&Domain::Interest.default_window()), None);
    }

    #[test]
    fn interest_view_uses_upstream_trend() {
        let payload = Payload::Interest(InterestPayload {
            keyword: "Rust".to_string(),
            source: None,
            stats: Some(InterestStats {
                prediction_trend: Some(TrendDirection::Rising),
                ..InterestStats::default()
            }),
            graph_data: vec![
                InterestRow { date: d(1), actual: Some(5.0), predicted: Some(4.0) },
                InterestRow { date: d(2), actual: None, predicted: Some(1.0) },
            ],
        });
        let view = ForecastView::from_payload(&payload);
        assert_eq!(view.title, "Rust");
        assert_eq!(view.pivot, Some(1));
        assert_eq!(view.insight.summary().unwrap().trend, TrendDirection::Rising);
    }
}
