//! Ratatui-based terminal UI.
//!
//! The TUI provides a query input, a domain switch, and two window sliders
//! (history / prediction months), then renders the windowed forecast chart,
//! insight cards and, for prices, the sales watchlist.
//!
//! Fetches run on a worker thread and report back over a channel; the event
//! loop never blocks on the network.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::ForecastView;
use crate::app::request::{RequestTracker, Ticket};
use crate::cli::TuiArgs;
use crate::data::{ForecastClient, Query};
use crate::domain::{Domain, Payload, WindowSpec};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::{PulsePlottersChart, fmt_day_offset};

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(&args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Where payloads come from.
#[derive(Clone)]
enum Source {
    Live(ForecastClient),
    Demo { seed: u64 },
}

impl Source {
    fn fetch(&self, query: &Query) -> Result<Payload, AppError> {
        match self {
            Source::Live(client) => client.fetch(query),
            Source::Demo { seed } => crate::app::sample_payload(query, crate::app::today(), *seed),
        }
    }
}

/// A finished fetch, tagged with its ticket id.
struct Fetched {
    id: u64,
    result: Result<Payload, AppError>,
}

/// Which slider the arrow keys adjust.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slider {
    History,
    Prediction,
}

struct App {
    spec: WindowSpec,
    input: String,
    editing: bool,
    slider: Slider,
    status: String,
    source: Source,
    tracker: RequestTracker,
    tx: Sender<Fetched>,
    rx: Receiver<Fetched>,
    view: Option<ForecastView>,
}

impl App {
    fn new(args: &TuiArgs) -> Result<Self, AppError> {
        let source = if args.demo {
            Source::Demo { seed: args.seed }
        } else {
            Source::Live(ForecastClient::from_env()?)
        };
        let (tx, rx) = mpsc::channel();
        let mut app = Self {
            spec: WindowSpec::new(args.domain, args.history, args.predict),
            input: String::new(),
            editing: false,
            slider: Slider::History,
            status: String::new(),
            source,
            tracker: RequestTracker::new(Duration::from_millis(args.debounce_ms)),
            tx,
            rx,
            view: None,
        };
        app.status = app.idle_hint();
        if let Some(query) = args.query.as_deref().filter(|q| !q.trim().is_empty()) {
            app.input = query.trim().to_string();
            app.submit(Instant::now());
        }
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            needs_redraw |= self.pump_requests(Instant::now());

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Issue due requests and apply finished ones. Returns true if anything changed.
    fn pump_requests(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some(ticket) = self.tracker.poll(now) {
            self.status = format!("Fetching forecast for '{}'...", ticket.query.text());
            self.spawn_fetch(ticket);
            changed = true;
        }

        loop {
            match self.rx.try_recv() {
                Ok(fetched) => {
                    if self.tracker.complete(fetched.id) {
                        self.apply_result(fetched.result);
                        changed = true;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        changed
    }

    fn spawn_fetch(&self, ticket: Ticket) {
        let source = self.source.clone();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = source.fetch(&ticket.query);
            // The receiver only goes away when the TUI exits.
            let _ = tx.send(Fetched {
                id: ticket.id,
                result,
            });
        });
    }

    fn apply_result(&mut self, result: Result<Payload, AppError>) {
        match result {
            Ok(payload) if payload.domain() == self.spec.domain() => {
                let view = ForecastView::from_payload(&payload);
                self.status = match view.pivot.and_then(|i| view.merged.get(i)) {
                    Some(today) => format!("Loaded {} points (today: {}).", view.merged.len(), today.date),
                    None => "Payload contained no data points.".to_string(),
                };
                self.view = Some(view);
            }
            Ok(_) => {
                // Domain was switched while the request was in flight.
                self.status = self.idle_hint();
            }
            Err(err) => {
                tracing::warn!(error = %err, "fetch failed");
                self.status = err.message().to_string();
                self.view = None;
            }
        }
    }

    fn submit(&mut self, now: Instant) {
        let text = self.input.trim();
        if text.is_empty() {
            self.status = self.idle_hint();
            return;
        }
        let query = Query::new(self.spec.domain(), text);
        self.tracker.submit(query, now);
        self.status = "Queued...".to_string();
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_input(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('/') | KeyCode::Enter => {
                self.editing = true;
                self.status = "Type a query. Enter to search, Esc to cancel.".to_string();
            }
            KeyCode::Tab => {
                let next = self.spec.domain().next();
                self.spec = self.spec.with_domain(next);
                self.tracker.cancel();
                self.view = None;
                self.input.clear();
                self.status = self.idle_hint();
            }
            KeyCode::Up => self.slider = Slider::History,
            KeyCode::Down => self.slider = Slider::Prediction,
            KeyCode::Left => self.adjust_slider(-1),
            KeyCode::Right => self.adjust_slider(1),
            KeyCode::Char('r') => self.submit(Instant::now()),
            KeyCode::Char('e') => self.export_window(),
            _ => {}
        }
        false
    }

    fn handle_input(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Search canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.submit(Instant::now());
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    fn adjust_slider(&mut self, delta: i32) {
        match self.slider {
            Slider::History => {
                if self.spec.domain() == Domain::Price {
                    self.status = "Price history always shows the full span.".to_string();
                    return;
                }
                self.spec.step_history(delta);
                self.status = format!("history: {} months", self.spec.history_months());
            }
            Slider::Prediction => {
                self.spec.step_prediction(delta);
                self.status = format!("prediction: {} months", self.spec.prediction_months());
            }
        }
    }

    fn export_window(&mut self) {
        let Some(view) = &self.view else {
            self.status = "Nothing to export yet.".to_string();
            return;
        };
        let path = PathBuf::from(format!(
            "pulse_window_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        self.status = match crate::io::write_window_csv(&path, view.window(&self.spec)) {
            Ok(()) => format!("Exported window: {}", path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn idle_hint(&self) -> String {
        match self.spec.domain() {
            Domain::Interest => "Press / to search a topic (e.g. Bitcoin).".to_string(),
            Domain::Price => "Press / to paste a product link.".to_string(),
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("pulse", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {}", self.spec.domain().display_name())),
        ]));

        let (title, source) = match &self.view {
            Some(view) => (view.title.clone(), view.source.clone().unwrap_or_default()),
            None => ("-".to_string(), String::new()),
        };
        let busy = if self.tracker.is_busy() { " | loading…" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("{title}  {source}{busy}"),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(40)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(5)])
            .split(columns[0]);

        self.draw_chart(frame, left[0]);
        self.draw_settings(frame, left[1]);
        self.draw_insights(frame, columns[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.view else {
            let msg = Paragraph::new("Waiting for data...")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        };

        let Some(series) = chart_series(view, &self.spec) else {
            let msg = Paragraph::new("No data in the selected window.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, with_axes) = chart_layout(inner);
        let widget = PulsePlottersChart {
            observed: &series.observed,
            predicted: &series.predicted,
            pivot_x: series.pivot_x,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            origin: series.origin,
            y_label: view.domain.value_label(),
            fmt_y: fmt_axis_y,
        };

        frame.render_widget(widget, chart_rect);
        if with_axes {
            draw_axis_ticks(frame, inner, chart_rect, &series, view.domain.value_label());
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let history = match self.spec.domain() {
            Domain::Interest => format!("Past History: {} months", self.spec.history_months()),
            Domain::Price => "Past History: full".to_string(),
        };
        let items = vec![
            ListItem::new(history),
            ListItem::new(format!("Future Prediction: {} months", self.spec.prediction_months())),
            ListItem::new(format!(
                "Query: {}{}",
                self.input,
                if self.editing { "▏" } else { "" }
            )),
        ];

        let list = List::new(items)
            .block(Block::default().title("Window").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(match (self.editing, self.slider) {
            (true, _) => 2,
            (false, Slider::History) => 0,
            (false, Slider::Prediction) => 1,
        }));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_insights(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        match &self.view {
            Some(view) => {
                let cards = crate::report::format_insight(&view.insight, view.domain);
                lines.extend(cards.lines().map(|l| Line::from(l.to_string())));
                if view.domain == Domain::Price {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        "Upcoming Sales",
                        Style::default().add_modifier(Modifier::BOLD),
                    )));
                    if view.sales.is_empty() {
                        lines.push(Line::from("No upcoming sales detected for this site yet."));
                    }
                    for sale in &view.sales {
                        lines.push(Line::from(format!(
                            "• {} ({})",
                            sale.name,
                            sale.date.as_deref().unwrap_or("date tbc")
                        )));
                    }
                }
            }
            None => lines.push(Line::from(Span::styled("-", Style::default().fg(Color::Gray)))),
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Insights").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.editing {
            "Enter search  Esc cancel"
        } else {
            "/ search  Tab domain  ↑/↓ slider  ←/→ adjust  r refetch  e export  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series for the current window.
#[derive(Debug, Clone, PartialEq)]
struct ChartSeries {
    observed: Vec<(f64, f64)>,
    predicted: Vec<(f64, f64)>,
    pivot_x: Option<f64>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    origin: chrono::NaiveDate,
}

/// Build chart series for Plotters. `None` when the window is empty.
fn chart_series(view: &ForecastView, spec: &WindowSpec) -> Option<ChartSeries> {
    let window = view.window(spec);
    let origin = window.first()?.date;
    let x_of = |date: chrono::NaiveDate| (date - origin).num_days() as f64;

    let mut observed = Vec::new();
    let mut predicted = Vec::new();
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in window {
        let x = x_of(p.date);
        if let Some(v) = p.observed {
            observed.push((x, v));
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
        if let Some(v) = p.predicted {
            predicted.push((x, v));
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
    }

    let mut x1 = window.last().map(|p| x_of(p.date)).unwrap_or(0.0);
    if x1 <= 0.0 {
        x1 = 1.0;
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    } else if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    let pivot_x = view
        .pivot_in_window(spec)
        .and_then(|i| window.get(i))
        .map(|p| x_of(p.date));

    Some(ChartSeries {
        observed,
        predicted,
        pivot_x,
        x_bounds: [0.0, x1],
        y_bounds: [y_min - pad, y_max + pad],
        origin,
    })
}

fn fmt_axis_y(v: f64) -> String {
    if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1000.0)
    } else {
        format!("{v:.0}")
    }
}

/// Cells reserved around the plot for tick labels and the legend.
const LEFT_GUTTER: u16 = 8;
const RIGHT_GUTTER: u16 = 2;
const TOP_GUTTER: u16 = 1;
const BOTTOM_GUTTER: u16 = 2;

/// Plot rectangle inside `inner`; `false` when there is no room for gutters.
fn chart_layout(inner: Rect) -> (Rect, bool) {
    let min_w = LEFT_GUTTER + RIGHT_GUTTER + 10;
    let min_h = TOP_GUTTER + BOTTOM_GUTTER + 5;
    if inner.width <= min_w || inner.height <= min_h {
        return (inner, false);
    }
    let plot = Rect::new(
        inner.x + LEFT_GUTTER,
        inner.y + TOP_GUTTER,
        inner.width - LEFT_GUTTER - RIGHT_GUTTER,
        inner.height - TOP_GUTTER - BOTTOM_GUTTER,
    );
    (plot, true)
}

/// Evenly spaced fractions `0.0..=1.0`, `count` of them.
fn tick_fractions(count: usize) -> impl Iterator<Item = f64> {
    let last = count.saturating_sub(1).max(1) as f64;
    (0..count).map(move |i| i as f64 / last)
}

fn put_label(frame: &mut ratatui::Frame<'_>, x: u16, y: u16, text: String, style: Style) {
    let width = text.chars().count() as u16;
    frame.render_widget(Paragraph::new(text).style(style), Rect::new(x, y, width, 1));
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    series: &ChartSeries,
    y_label: &str,
) {
    const TICKS: usize = 4;
    let dim = Style::default().fg(Color::Gray);
    let [x0, x1] = series.x_bounds;
    let [y0, y1] = series.y_bounds;
    let bottom = inner.y + inner.height;

    let date_row = chart.y + chart.height;
    if date_row + 1 < bottom {
        let right_edge = chart.x + chart.width;
        for u in tick_fractions(TICKS) {
            let text = fmt_day_offset(series.origin, x0 + u * (x1 - x0));
            let half = text.len() as u16 / 2;
            let centre = chart.x + (u * f64::from(chart.width - 1)).round() as u16;
            let x = centre.saturating_sub(half).min(right_edge.saturating_sub(text.len() as u16));
            put_label(frame, x, date_row, text, dim);
        }
    }

    let value_col = inner.x + LEFT_GUTTER - 1;
    for u in tick_fractions(TICKS) {
        let text = fmt_axis_y(y0 + u * (y1 - y0));
        let Some(x) = value_col.checked_sub(text.len() as u16).filter(|x| *x >= inner.x) else {
            continue;
        };
        let row = chart.y + chart.height - 1 - (u * f64::from(chart.height - 1)).round() as u16;
        put_label(frame, x, row, text, dim);
    }

    let legend_row = date_row + 1;
    if legend_row < bottom {
        let legend = Paragraph::new(Line::from(vec![
            Span::styled("─ observed", Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled("─ forecast", Style::default().fg(Color::Magenta)),
            Span::raw("  "),
            Span::styled("| today", Style::default().fg(Color::Yellow)),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(legend, Rect::new(chart.x, legend_row, chart.width, 1));
    }

    put_label(frame, inner.x, inner.y, y_label.to_string(), dim.add_modifier(Modifier::BOLD));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PricePayload, PricePoint};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    fn price_view() -> ForecastView {
        ForecastView::from_payload(&Payload::Price(PricePayload {
            history: vec![
                PricePoint { date: d(1), price: 100.0 },
                PricePoint { date: d(3), price: 120.0 },
            ],
            forecast: vec![
                PricePoint { date: d(3), price: 120.0 },
                PricePoint { date: d(6), price: 90.0 },
            ],
            current_price: Some(120.0),
            ..PricePayload::default()
        }))
    }

    fn demo_app(query: Option<&str>) -> App {
        let args = TuiArgs {
            domain: Domain::Interest,
            query: query.map(str::to_string),
            history: 12,
            predict: 6,
            debounce_ms: 100,
            demo: true,
            seed: 7,
            log_file: None,
        };
        App::new(&args).unwrap()
    }

    #[test]
    fn switching_domain_drops_queued_query() {
        let mut app = demo_app(Some("Bitcoin"));
        assert!(app.tracker.is_busy());

        assert!(!app.handle_key(KeyCode::Tab));
        assert_eq!(app.spec.domain(), Domain::Price);
        assert!(!app.tracker.is_busy());
        assert!(app.tracker.poll(Instant::now() + Duration::from_secs(1)).is_none());
        assert!(!app.pump_requests(Instant::now() + Duration::from_secs(1)));
    }

    #[test]
    fn query_survives_without_domain_switch() {
        let mut app = demo_app(Some("Bitcoin"));
        let ticket = app.tracker.poll(Instant::now() + Duration::from_secs(1)).unwrap();
        assert_eq!(ticket.query, Query::Interest("Bitcoin".to_string()));
    }

    #[test]
    fn chart_x_is_days_from_window_start() {
        let view = price_view();
        let series = chart_series(&view, &Domain::Price.default_window()).unwrap();
        assert_eq!(series.origin, d(1));
        assert_eq!(series.observed, vec![(0.0, 100.0), (2.0, 120.0)]);
        assert_eq!(series.predicted, vec![(2.0, 120.0), (5.0, 90.0)]);
        assert_eq!(series.pivot_x, Some(5.0));
        assert_eq!(series.x_bounds, [0.0, 5.0]);
        assert!(series.y_bounds[0] < 90.0 && series.y_bounds[1] > 120.0);
    }

    #[test]
    fn empty_view_has_no_series() {
        let view = ForecastView::from_payload(&Payload::Price(PricePayload::default()));
        assert!(chart_series(&view, &Domain::Price.default_window()).is_none());
    }

    #[test]
    fn axis_labels_compact_large_values() {
        assert_eq!(fmt_axis_y(12_345.0), "12k");
        assert_eq!(fmt_axis_y(999.4), "999");
    }

    #[test]
    fn tiny_area_skips_gutters() {
        let (rect, with_axes) = chart_layout(Rect::new(0, 0, 12, 6));
        assert_eq!(rect, Rect::new(0, 0, 12, 6));
        assert!(!with_axes);

        let (rect, with_axes) = chart_layout(Rect::new(0, 0, 80, 20));
        assert_eq!(rect, Rect::new(8, 1, 70, 17));
        assert!(with_axes);
    }
}
