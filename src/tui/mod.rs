//! Ratatui-based terminal dashboard.
//!
//! Three views over the same pipeline output (monthly variation, cumulative
//! inflation, forecast) plus a side panel with indicators and cleaning
//! diagnostics. Every key press that changes an option re-runs the pipeline on
//! the already-loaded data; only `r` hits the data source again.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};

use crate::app::pipeline::{RunOutput, run_with_data};
use crate::clean::CleanOutput;
use crate::domain::{DashboardConfig, ForecastScope, YearMonth};
use crate::error::AppError;
use crate::present::{ChartData, cumulative_chart, forecast_chart, series_chart};

mod plotters_chart;

use plotters_chart::DashboardChart;

/// Longest horizon reachable from the keyboard.
const MAX_TUI_HORIZON: usize = 24;

/// Start the TUI.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let data = crate::data::load_series(&config);
    let mut app = App::new(config, data);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Monthly,
    Cumulative,
    Forecast,
}

impl View {
    const ALL: [View; 3] = [View::Monthly, View::Cumulative, View::Forecast];

    fn title(self) -> &'static str {
        match self {
            View::Monthly => "Monthly",
            View::Cumulative => "Cumulative",
            View::Forecast => "Forecast",
        }
    }

    fn index(self) -> usize {
        match self {
            View::Monthly => 0,
            View::Cumulative => 1,
            View::Forecast => 2,
        }
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

struct App {
    config: DashboardConfig,
    view: View,
    /// Loaded data, or why loading failed.
    data: Result<CleanOutput, AppError>,
    run: Option<RunOutput>,
    status: String,
}

impl App {
    fn new(config: DashboardConfig, data: Result<CleanOutput, AppError>) -> Self {
        let mut app = Self {
            config,
            view: View::Monthly,
            data,
            run: None,
            status: String::new(),
        };
        app.recompute();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
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

    /// Apply a key press. Returns `true` to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('1') => self.view = View::Monthly,
            KeyCode::Char('2') => self.view = View::Cumulative,
            KeyCode::Char('3') => self.view = View::Forecast,
            KeyCode::Left => self.shift_start_year(-1),
            KeyCode::Right => self.shift_start_year(1),
            KeyCode::Char('b') => {
                let display = &mut self.config.display;
                display.show_confidence_band = !display.show_confidence_band;
                self.status = format!("band: {}", on_off(display.show_confidence_band));
            }
            KeyCode::Char('g') => {
                let display = &mut self.config.display;
                display.granularity = display.granularity.toggle();
                self.status = format!("granularity: {}", display.granularity.label());
            }
            KeyCode::Char('s') => {
                self.config.forecast.scope = match self.config.forecast.scope {
                    ForecastScope::Window => ForecastScope::Full,
                    ForecastScope::Full => ForecastScope::Window,
                };
                self.recompute();
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.set_horizon(self.config.forecast.horizon + 1),
            KeyCode::Char('-') => self.set_horizon(self.config.forecast.horizon.saturating_sub(1)),
            KeyCode::Char('r') => {
                self.data = crate::data::load_series(&self.config);
                self.recompute();
                if self.data.is_ok() {
                    self.status = format!("reloaded: {}", self.status);
                }
            }
            _ => {}
        }
        false
    }

    fn shift_start_year(&mut self, delta: i32) {
        let start = self.config.window.start;
        let mut year = start.year() + delta;
        if let Ok(data) = &self.data {
            if let (Some(first), Some(last)) = (data.series.first(), data.series.last()) {
                year = year.clamp(first.date.year(), last.date.year());
            }
        }
        if let Some(next) = YearMonth::new(year, start.month()) {
            if next != start {
                self.config.window.start = next;
                self.recompute();
            }
        }
    }

    fn set_horizon(&mut self, horizon: usize) {
        let horizon = horizon.clamp(1, MAX_TUI_HORIZON);
        if horizon != self.config.forecast.horizon {
            self.config.forecast.horizon = horizon;
            self.recompute();
        }
    }

    /// Re-run every stage on the loaded data.
    fn recompute(&mut self) {
        match &self.data {
            Ok(data) => {
                let run = run_with_data(&self.config, data.clone());
                self.status = format!(
                    "window {} .. | {} month(s) | forecast on {}",
                    self.config.window.start,
                    run.window.len(),
                    match self.config.forecast.scope {
                        ForecastScope::Window => "window",
                        ForecastScope::Full => "full series",
                    }
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("load failed: {err}");
                self.run = None;
            }
        }
    }

    /// Chart for the current view, or the reason there is none.
    fn current_chart(&self) -> Result<ChartData, AppError> {
        let run = match (&self.run, &self.data) {
            (Some(run), _) => run,
            (None, Err(err)) => return Err(err.clone()),
            (None, Ok(_)) => return Err(AppError::window_empty("Nothing computed yet.")),
        };
        let display = &self.config.display;
        match self.view {
            View::Monthly => series_chart(&run.window, display),
            View::Cumulative => run.cumulative.clone().and_then(|c| cumulative_chart(&c, display)),
            View::Forecast => match &run.forecast {
                None => Err(AppError::config("Forecasting is disabled (`--no-forecast`).")),
                Some(Err(err)) => Err(err.clone()),
                Some(Ok(f)) => forecast_chart(run.forecast_input(&self.config), f, display),
            },
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
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
        let source = crate::data::source_label(&self.config);
        let coverage = match &self.data {
            Ok(data) => match (data.series.first(), data.series.last()) {
                (Some(a), Some(b)) => format!("{} .. {} ({} months)", a.date, b.date, data.series.len()),
                _ => "-".to_string(),
            },
            Err(_) => "-".to_string(),
        };

        let title = Line::from(vec![
            Span::styled("ipca", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {source} | {coverage}")),
        ]);
        let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()).collect::<Vec<_>>())
            .select(self.view.index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .divider("|");

        let block = Block::default().borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);
        frame.render_widget(Paragraph::new(title), rows[0]);
        frame.render_widget(tabs, rows[1]);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_panel(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        match self.current_chart() {
            Ok(chart) => {
                let block = Block::default().title(chart.title.clone()).borders(Borders::ALL);
                let inner = block.inner(area);
                frame.render_widget(block, area);
                frame.render_widget(Clear, inner);
                frame.render_widget(DashboardChart { chart: &chart }, inner);
            }
            Err(err) => {
                let block = Block::default().title(self.view.title()).borders(Borders::ALL);
                let msg = Paragraph::new(format!("No data: {err}"))
                    .style(Style::default().fg(Color::Yellow))
                    .wrap(Wrap { trim: true })
                    .block(block);
                frame.render_widget(msg, area);
            }
        }
    }

    fn draw_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let p = Paragraph::new(Text::from(panel_lines(&self.config, self.run.as_ref())))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Indicators").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab/1-3 view  ←/→ start year  b band  g granularity  s scope  +/- horizon  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Side-panel text: window indicators, forecast headline, cleaning counts.
fn panel_lines(config: &DashboardConfig, run: Option<&RunOutput>) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let row = |name: &str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<14}"), label), Span::styled(value, bold)])
    };

    let mut lines = Vec::new();
    lines.push(row("start", config.window.start.to_string()));
    lines.push(row("band", on_off(config.display.show_confidence_band).to_string()));
    lines.push(row("granularity", config.display.granularity.label().to_string()));
    lines.push(row("model", format!("ARIMA{}", config.forecast.order)));
    lines.push(row("horizon", format!("{} month(s)", config.forecast.horizon)));
    lines.push(Line::raw(""));

    let Some(run) = run else {
        lines.push(Line::styled("no data", Style::default().fg(Color::Yellow)));
        return lines;
    };

    match &run.kpis {
        Some(k) => {
            lines.push(row("months", k.months.to_string()));
            lines.push(row("cumulative", format!("{:.2}%", k.cumulative_pct)));
            lines.push(row("avg monthly", format!("{:.2}%", k.average_monthly_pct)));
            lines.push(row(
                "last 12m",
                k.trailing_12m_pct.map(|v| format!("{v:.2}%")).unwrap_or_else(|| "n/a".to_string()),
            ));
            lines.push(row("peak", format!("{:.2}% {}", k.peak.monthly_variation_pct, k.peak.date)));
            lines.push(row("trough", format!("{:.2}% {}", k.trough.monthly_variation_pct, k.trough.date)));
        }
        None => lines.push(Line::styled("window is empty", Style::default().fg(Color::Yellow))),
    }

    lines.push(Line::raw(""));
    match &run.forecast {
        Some(Ok(f)) => {
            if let Some(mean) = f.mean_point() {
                lines.push(row("next avg", format!("{mean:.2}%/month")));
            }
            if let (Some(lo), Some(hi)) = (f.lower_bound.first(), f.upper_bound.first()) {
                lines.push(row(
                    &format!("{:.0}% next", f.confidence_level * 100.0),
                    format!("[{lo:.2}, {hi:.2}]"),
                ));
            }
        }
        Some(Err(err)) => lines.push(Line::styled(
            format!("forecast: {err}"),
            Style::default().fg(Color::Yellow),
        )),
        None => lines.push(row("forecast", "off".to_string())),
    }

    let report = &run.data.report;
    lines.push(Line::raw(""));
    lines.push(row("dropped rows", report.dropped.len().to_string()));
    lines.push(row("duplicates", report.duplicates.len().to_string()));
    lines.push(row("missing", report.gaps.len().to_string()));
    lines
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}
