//! Shared domain types.
//!
//! Plain `Copy`/serde types shared by:
//!
//! - the merge/window/insight engine
//! - exported to JSON/CSV
//! - handed to the terminal renderers without conversion

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Approximate length of a month in days.
///
/// Window magnitudes are expressed in months but applied as day offsets into the
/// merged sequence; this is not calendar-aware.
pub const DAYS_PER_MONTH: usize = 30;

/// Which forecast family a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Wikipedia pageview history plus a projected trend.
    Interest,
    /// Scraped product price history plus a projected price.
    Price,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Interest, Domain::Price];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Domain::Interest => "Wiki Trends",
            Domain::Price => "Price Tracker",
        }
    }

    /// Unit label for the y-axis.
    pub fn value_label(self) -> &'static str {
        match self {
            Domain::Interest => "views/day",
            Domain::Price => "price",
        }
    }

    pub fn next(self) -> Domain {
        match self {
            Domain::Interest => Domain::Price,
            Domain::Price => Domain::Interest,
        }
    }

    /// Allowed history magnitude in months (inclusive).
    ///
    /// The price domain shows an implicit fixed span, so min == max.
    pub fn history_bounds(self) -> (u32, u32) {
        match self {
            Domain::Interest => (3, 48),
            Domain::Price => (PRICE_HISTORY_MONTHS, PRICE_HISTORY_MONTHS),
        }
    }

    /// Allowed prediction magnitude in months (inclusive).
    pub fn prediction_bounds(self) -> (u32, u32) {
        (1, 12)
    }

    pub fn default_window(self) -> WindowSpec {
        match self {
            Domain::Interest => WindowSpec {
                domain: self,
                history_months: 12,
                prediction_months: 6,
            },
            Domain::Price => WindowSpec {
                domain: self,
                history_months: PRICE_HISTORY_MONTHS,
                prediction_months: 12,
            },
        }
    }
}

/// Fixed history span used for the price domain.
pub const PRICE_HISTORY_MONTHS: u32 = 48;

/// One measured value (interest count or price) on a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One projected value for a calendar day, produced by the external forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Per-day union of observed and predicted values.
///
/// In the interest domain at most one side is present; in the price domain an
/// overlapping day may carry both so the two lines join up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub date: NaiveDate,
    pub observed: Option<f64>,
    pub predicted: Option<f64>,
}

impl MergedPoint {
    /// True when the day carries only a projection.
    pub fn is_forecast_only(&self) -> bool {
        self.predicted.is_some() && self.observed.is_none()
    }
}

/// User-adjustable window magnitudes.
///
/// Setters clamp into the domain bounds, so a `WindowSpec` is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    domain: Domain,
    history_months: u32,
    prediction_months: u32,
}

impl WindowSpec {
    pub fn new(domain: Domain, history_months: u32, prediction_months: u32) -> Self {
        let mut spec = domain.default_window();
        spec.set_history_months(history_months);
        spec.set_prediction_months(prediction_months);
        spec
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn history_months(&self) -> u32 {
        self.history_months
    }

    pub fn prediction_months(&self) -> u32 {
        self.prediction_months
    }

    pub fn set_history_months(&mut self, months: u32) {
        let (lo, hi) = self.domain.history_bounds();
        self.history_months = months.clamp(lo, hi);
    }

    pub fn set_prediction_months(&mut self, months: u32) {
        let (lo, hi) = self.domain.prediction_bounds();
        self.prediction_months = months.clamp(lo, hi);
    }

    /// Nudge the history magnitude by `delta` months (clamped).
    pub fn step_history(&mut self, delta: i32) {
        self.set_history_months(self.history_months.saturating_add_signed(delta));
    }

    /// Nudge the prediction magnitude by `delta` months (clamped).
    pub fn step_prediction(&mut self, delta: i32) {
        self.set_prediction_months(self.prediction_months.saturating_add_signed(delta));
    }

    /// Switch to another domain, keeping the prediction magnitude where allowed.
    pub fn with_domain(&self, domain: Domain) -> Self {
        if domain == self.domain {
            return *self;
        }
        let history = domain.default_window().history_months;
        WindowSpec::new(domain, history, self.prediction_months)
    }
}

/// Direction of the projected trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Rising,
    Falling,
}

impl TrendDirection {
    pub fn label(self) -> &'static str {
        match self {
            TrendDirection::Rising => "Rising",
            TrendDirection::Falling => "Falling",
        }
    }
}

/// Coarse qualitative tag describing forecast sample size.
///
/// This is not a statistical confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Zero or one forecast point.
    Baseline,
    /// Two or more forecast points.
    #[serde(rename = "Model-based")]
    ModelBased,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::Baseline => "Baseline",
            Confidence::ModelBased => "Model-based",
        }
    }
}

/// The lowest projected point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DipPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Scalar summaries over the observed and predicted portions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSummary {
    pub peak: f64,
    pub average: f64,
    pub current_value: f64,
    pub lowest_value: f64,
    pub trend: TrendDirection,
    /// `None` when no forecast points exist ("Forecast unavailable").
    pub next_dip: Option<DipPoint>,
    pub confidence: Confidence,
}

/// Result of insight derivation.
///
/// `Unavailable` is returned instead of partial or `NaN` values when there is no
/// observed data to summarize.
#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    Available(InsightSummary),
    Unavailable,
}

impl Insight {
    pub fn summary(&self) -> Option<&InsightSummary> {
        match self {
            Insight::Available(s) => Some(s),
            Insight::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Insight::Available(_))
    }
}
