//! Insight derivation: peak, average, extrema, trend, next dip, confidence.
//!
//! Both entry points are total: an empty observed side yields
//! `Insight::Unavailable` rather than `NaN`, infinities or a placeholder zero.

use crate::domain::{
    Confidence, DipPoint, Insight, InsightSummary, MergedPoint, ObservedPoint, PredictedPoint,
    TrendDirection,
};

/// Summaries for the interest domain.
///
/// `upstream_trend` is the service's `prediction_trend`, passed through as-is.
/// When the payload omits it the trend falls back to comparing the last
/// projected value with the last observed value.
pub fn derive_interest(points: &[MergedPoint], upstream_trend: Option<TrendDirection>) -> Insight {
    let observed: Vec<f64> = points.iter().filter_map(|p| p.observed).collect();
    let Some(stats) = ObservedStats::from_values(&observed) else {
        return Insight::Unavailable;
    };

    let forecast: Vec<DipPoint> = points
        .iter()
        .filter(|p| p.is_forecast_only())
        .filter_map(|p| p.predicted.map(|value| DipPoint { date: p.date, value }))
        .collect();

    let trend = upstream_trend.unwrap_or_else(|| {
        let last_projected = points.iter().rev().find_map(|p| p.predicted);
        trend_from(stats.last, last_projected)
    });

    Insight::Available(InsightSummary {
        peak: stats.max,
        average: stats.mean,
        current_value: stats.last,
        lowest_value: stats.min,
        trend,
        next_dip: next_dip(forecast.iter().copied()),
        confidence: confidence_for(forecast.len()),
    })
}

/// Summaries for the price domain.
///
/// `current_price` is the service-supplied latest price; when absent, the last
/// history value stands in.
pub fn derive_price(
    history: &[ObservedPoint],
    forecast: &[PredictedPoint],
    current_price: Option<f64>,
) -> Insight {
    let values: Vec<f64> = history.iter().map(|p| p.value).collect();
    let Some(stats) = ObservedStats::from_values(&values) else {
        return Insight::Unavailable;
    };

    let current = current_price.filter(|v| v.is_finite()).unwrap_or(stats.last);
    let last_forecast = forecast.last().map(|p| p.value);

    Insight::Available(InsightSummary {
        peak: stats.max,
        average: stats.mean,
        current_value: current,
        lowest_value: stats.min,
        trend: trend_from(current, last_forecast),
        next_dip: next_dip(forecast.iter().map(|p| DipPoint {
            date: p.date,
            value: p.value,
        })),
        confidence: confidence_for(forecast.len()),
    })
}

/// Minimum-value point via a single left-to-right reduction.
///
/// Only a strictly lower value replaces the running minimum, so ties keep the
/// earliest point.
pub fn next_dip(points: impl IntoIterator<Item = DipPoint>) -> Option<DipPoint> {
    points.into_iter().fold(None, |acc, p| match acc {
        Some(best) if p.value >= best.value => Some(best),
        _ => Some(p),
    })
}

/// `Model-based` once there is more than one forecast point.
pub fn confidence_for(forecast_len: usize) -> Confidence {
    if forecast_len > 1 {
        Confidence::ModelBased
    } else {
        Confidence::Baseline
    }
}

fn trend_from(current: f64, projected: Option<f64>) -> TrendDirection {
    match projected {
        Some(v) if v > current => TrendDirection::Rising,
        _ => TrendDirection::Falling,
    }
}

struct ObservedStats {
    min: f64,
    max: f64,
    mean: f64,
    last: f64,
}

impl ObservedStats {
    fn from_values(values: &[f64]) -> Option<Self> {
        let last = *values.last()?;
        if values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        // Running mean; a plain sum overflows near f64::MAX.
        let mut mean = 0.0;
        for (i, &v) in values.iter().enumerate() {
            min = min.min(v);
            max = max.max(v);
            mean += (v - mean) / (i + 1) as f64;
        }
        // Keep peak >= average >= lowest under rounding.
        let mean = mean.clamp(min, max);
        Some(Self { min, max, mean, last })
    }
}
