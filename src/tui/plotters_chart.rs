//! Forecast chart drawn with Plotters into a Ratatui buffer.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 8;

const OBSERVED: RGBColor = RGBColor(0, 255, 255);
const PREDICTED: RGBColor = RGBColor(255, 0, 255);
const PIVOT: RGBColor = RGBColor(255, 255, 0);

/// Observed and predicted lines over a shared day axis, plus a "today" rule.
///
/// x values are day offsets from `origin`; bounds are precomputed by the caller.
pub struct PulsePlottersChart<'a> {
    pub observed: &'a [(f64, f64)],
    pub predicted: &'a [(f64, f64)],
    /// X position of the first forecast-only day, if visible.
    pub pivot_x: Option<f64>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Date at x = 0.
    pub origin: NaiveDate,
    pub y_label: &'a str,
    pub fmt_y: fn(f64) -> String,
}

impl PulsePlottersChart<'_> {
    fn drawable(&self) -> bool {
        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        [x0, x1, y0, y1].iter().all(|v| v.is_finite()) && x0 < x1 && y0 < y1
    }
}

impl Widget for PulsePlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            buf.set_string(
                area.x,
                area.y,
                "Enlarge the terminal to see the chart.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }
        if !self.drawable() {
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let origin = self.origin;
        let fmt_y = self.fmt_y;

        widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let text = ("sans-serif", 10).into_font().color(&WHITE);
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("date")
                .y_desc(self.y_label)
                .x_labels(4)
                .y_labels(4)
                .x_label_formatter(&|v| fmt_day_offset(origin, *v))
                .y_label_formatter(&|v| fmt_y(*v))
                .label_style(text)
                .axis_style(&WHITE)
                .draw()?;

            // Rule first so both lines draw over it.
            if let Some(px) = self.pivot_x {
                chart.draw_series(LineSeries::new([(px, y0), (px, y1)], &PIVOT))?;
            }
            chart.draw_series(LineSeries::new(self.observed.iter().copied(), &OBSERVED))?;
            chart.draw_series(LineSeries::new(self.predicted.iter().copied(), &PREDICTED))?;
            Ok(())
        })
        .render(area, buf);
    }
}

/// Render an x value (days from `origin`) as a date label.
pub fn fmt_day_offset(origin: NaiveDate, days: f64) -> String {
    if !days.is_finite() {
        return String::new();
    }
    origin
        .checked_add_signed(Duration::days(days.round() as i64))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_offsets_format_as_dates() {
        let origin = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        assert_eq!(fmt_day_offset(origin, 2.4), "2025-02-01");
        assert_eq!(fmt_day_offset(origin, f64::NAN), "");
    }
}
