//! Text plot of a forecast window for non-interactive output.
//!
//! Fixed-size character grid, deterministic for a given window and size.
//!
//! Plot elements:
//! - observed values: `o`
//! - projected values: `-` line
//! - pivot ("today") column: `|`

use crate::domain::MergedPoint;

/// Render the visible window. `pivot` is an index into `window`.
pub fn render_window_plot(
    window: &[MergedPoint],
    pivot: Option<usize>,
    width: usize,
    height: usize,
    value_label: &str,
) -> String {
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return "Plot: no data in window\n".to_string();
    };

    let (lo, hi) = value_bounds(window);
    let mut canvas = Canvas::new(width.max(10), height.max(5), window.len(), lo, hi);

    // Projection first so observed points can overlay the overlap days.
    let mut prev: Option<(usize, usize)> = None;
    for (i, p) in window.iter().enumerate() {
        let Some(v) = p.predicted else { continue };
        let cell = canvas.cell(i, v);
        match prev {
            Some(from) => canvas.line(from, cell, '-'),
            None => canvas.put(cell, '-'),
        }
        prev = Some(cell);
    }

    for (i, p) in window.iter().enumerate() {
        if let Some(v) = p.observed {
            let cell = canvas.cell(i, v);
            canvas.put(cell, 'o');
        }
    }

    if let Some(pivot) = pivot.filter(|i| *i < window.len()) {
        let col = canvas.col(pivot);
        for row in 0..canvas.height {
            canvas.fill((col, row), '|');
        }
    }

    let pivot_label = pivot
        .and_then(|i| window.get(i))
        .map(|p| p.date.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut out = format!(
        "Plot: {} .. {} | y=[{:.2}, {:.2}] {value_label} | pivot={pivot_label}\n",
        first.date, last.date, canvas.lo, canvas.hi
    );
    for row in canvas.cells.chunks(canvas.width) {
        out.extend(row.iter());
        out.push('\n');
    }
    out
}

/// Value range over both sides, widened by 5% so extremes stay off the border.
fn value_bounds(window: &[MergedPoint]) -> (f64, f64) {
    let (lo, hi) = window
        .iter()
        .flat_map(|p| [p.observed, p.predicted])
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let (lo, hi) = if !(lo.is_finite() && hi.is_finite()) {
        (0.0, 1.0)
    } else if hi <= lo {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    };
    let margin = ((hi - lo) * 0.05).max(1e-12);
    (lo - margin, hi + margin)
}

/// Row-major character grid with index/value -> cell mapping.
struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    last_index: f64,
    lo: f64,
    hi: f64,
}

impl Canvas {
    fn new(width: usize, height: usize, points: usize, lo: f64, hi: f64) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
            last_index: points.saturating_sub(1).max(1) as f64,
            lo,
            hi,
        }
    }

    fn col(&self, index: usize) -> usize {
        let u = (index as f64 / self.last_index).clamp(0.0, 1.0);
        (u * (self.width - 1) as f64).round() as usize
    }

    /// Row 0 is the top of the plot (highest value).
    fn row(&self, value: f64) -> usize {
        let u = ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        ((1.0 - u) * (self.height - 1) as f64).round() as usize
    }

    fn cell(&self, index: usize, value: f64) -> (usize, usize) {
        (self.col(index), self.row(value))
    }

    fn put(&mut self, (x, y): (usize, usize), ch: char) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = ch;
        }
    }

    /// Like `put`, but never overwrites a drawn cell.
    fn fill(&mut self, (x, y): (usize, usize), ch: char) {
        if x < self.width && y < self.height && self.cells[y * self.width + x] == ' ' {
            self.cells[y * self.width + x] = ch;
        }
    }

    /// Connect two cells by stepping along the longer axis.
    fn line(&mut self, (x0, y0): (usize, usize), (x1, y1): (usize, usize), ch: char) {
        let dx = x1 as f64 - x0 as f64;
        let dy = y1 as f64 - y0 as f64;
        let steps = dx.abs().max(dy.abs()) as usize;
        if steps == 0 {
            self.fill((x0, y0), ch);
            return;
        }
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = (x0 as f64 + dx * t).round() as usize;
            let y = (y0 as f64 + dy * t).round() as usize;
            self.fill((x, y), ch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(day: u32, observed: Option<f64>, predicted: Option<f64>) -> MergedPoint {
        MergedPoint {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            observed,
            predicted,
        }
    }

    #[test]
    fn small_window_snapshot() {
        let window = vec![
            point(1, Some(0.0), None),
            point(2, Some(10.0), None),
            point(3, None, Some(20.0)),
        ];

        let txt = render_window_plot(&window, Some(2), 10, 5, "views/day");
        let want = concat!(
            "Plot: 2025-01-01 .. 2025-01-03 | y=[-1.00, 21.00] views/day | pivot=2025-01-03\n",
            "         -\n",
            "         |\n",
            "     o   |\n",
            "         |\n",
            "o        |\n",
        );
        assert_eq!(txt, want);
    }

    #[test]
    fn empty_window_has_placeholder() {
        assert_eq!(render_window_plot(&[], None, 20, 5, "price"), "Plot: no data in window\n");
    }

    #[test]
    fn flat_single_point_does_not_panic() {
        let txt = render_window_plot(&[point(1, Some(5.0), None)], Some(0), 12, 6, "price");
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.contains('o'));
    }
}
