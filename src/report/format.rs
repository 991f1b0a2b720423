//! Formatted terminal output: insight cards, sales watchlist, window table.
//!
//! All strings users read in non-interactive mode are built here, so the engine
//! never formats anything.

use crate::app::pipeline::ForecastView;
use crate::domain::{Domain, Insight, MergedPoint, WindowSpec};

/// Shown in place of the next-dip card when there is no forecast.
pub const FORECAST_UNAVAILABLE: &str = "Forecast unavailable";
/// Shown in place of every card when there is no observed data.
pub const INSIGHTS_UNAVAILABLE: &str = "Insights unavailable (no observed data)";

/// Header + insight cards + (price) sales watchlist.
pub fn format_summary(view: &ForecastView, spec: &WindowSpec) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== pulse - {} ===\n", view.domain.display_name()));
    out.push_str(&format!("Title: {}\n", view.title));
    if let Some(source) = &view.source {
        out.push_str(&format!("Source: {source}\n"));
    }
    match view.domain {
        Domain::Interest => out.push_str(&format!(
            "Window: {} months history | {} months prediction\n",
            spec.history_months(),
            spec.prediction_months()
        )),
        Domain::Price => out.push_str(&format!(
            "Window: full history | {} months prediction\n",
            spec.prediction_months()
        )),
    }
    out.push_str(&format!(
        "Points: merged={} | visible={} | today={}\n",
        view.merged.len(),
        view.window(spec).len(),
        view.pivot
            .and_then(|i| view.merged.get(i))
            .map(|p| p.date.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ));

    out.push('\n');
    out.push_str(&format_insight(&view.insight, view.domain));

    if view.domain == Domain::Price {
        out.push_str("\nUpcoming sales watchlist:\n");
        if view.sales.is_empty() {
            out.push_str("  No upcoming sales detected for this site yet.\n");
        }
        for sale in &view.sales {
            out.push_str(&format!(
                "  - {} | {} | {}\n",
                sale.name,
                sale.date.as_deref().unwrap_or("date tbc"),
                sale.source.as_deref().unwrap_or("-"),
            ));
        }
    }

    out
}

/// Insight cards, labelled per domain.
pub fn format_insight(insight: &Insight, domain: Domain) -> String {
    let Some(s) = insight.summary() else {
        return format!("{INSIGHTS_UNAVAILABLE}\n");
    };

    let dip = s
        .next_dip
        .map(|d| format!("{} · {}", d.date, fmt_value(d.value, domain)))
        .unwrap_or_else(|| FORECAST_UNAVAILABLE.to_string());

    let mut out = String::new();
    match domain {
        Domain::Interest => {
            out.push_str(&format!("{:<22} {}\n", "Peak Interest:", fmt_value(s.peak, domain)));
            out.push_str(&format!("{:<22} {}\n", "Daily Average:", fmt_value(s.average, domain)));
            out.push_str(&format!("{:<22} {}\n", "Latest:", fmt_value(s.current_value, domain)));
            out.push_str(&format!("{:<22} {}\n", "Lowest:", fmt_value(s.lowest_value, domain)));
            out.push_str(&format!("{:<22} {}\n", "Future Forecast:", s.trend.label()));
            out.push_str(&format!("{:<22} {dip}\n", "Next Dip:"));
        }
        Domain::Price => {
            out.push_str(&format!("{:<22} {}\n", "Current Price:", fmt_value(s.current_value, domain)));
            out.push_str(&format!("{:<22} {}\n", "Lowest Recorded:", fmt_value(s.lowest_value, domain)));
            out.push_str(&format!("{:<22} {}\n", "Highest Recorded:", fmt_value(s.peak, domain)));
            out.push_str(&format!("{:<22} {}\n", "Average:", fmt_value(s.average, domain)));
            out.push_str(&format!("{:<22} {}\n", "Trend:", s.trend.label()));
            out.push_str(&format!("{:<22} {dip}\n", "Next Expected Dip:"));
        }
    }
    out.push_str(&format!("{:<22} {}\n", "Prediction Confidence:", s.confidence.label()));
    out
}

/// Window as a table; long windows keep the first and last `max_rows / 2` rows.
pub fn format_window_table(window: &[MergedPoint], max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<10} {:>14} {:>14}\n", "date", "observed", "predicted").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<14} {:-<14}\n", "", "", "").trim_end());
    out.push('\n');

    let max_rows = max_rows.max(2);
    let push_row = |out: &mut String, p: &MergedPoint| {
        out.push_str(
            format!(
                "{:<10} {:>14} {:>14}\n",
                p.date.to_string(),
                fmt_opt(p.observed),
                fmt_opt(p.predicted)
            )
            .trim_end(),
        );
        out.push('\n');
    };

    if window.len() <= max_rows {
        for p in window {
            push_row(&mut out, p);
        }
        return out;
    }

    let head = max_rows / 2;
    let tail = max_rows - head;
    for p in &window[..head] {
        push_row(&mut out, p);
    }
    out.push_str(&format!("... {} rows omitted ...\n", window.len() - max_rows));
    for p in &window[window.len() - tail..] {
        push_row(&mut out, p);
    }
    out
}

fn fmt_value(v: f64, domain: Domain) -> String {
    match domain {
        Domain::Interest => format!("{:.0}", v),
        Domain::Price => format!("{:.2}", v),
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}
