//! Terminal line chart of the running balance

use crate::balance::BalancePoint;
use crate::error::{HistoryError, Result};
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
    Terminal,
};
use std::io;
use std::time::Duration;

pub const CHART_TITLE: &str = "Account Value Over Time";
pub const X_AXIS_TITLE: &str = "Time";
pub const Y_AXIS_TITLE: &str = "Account Value";

const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 8;

/// Plot coordinates: x is epoch seconds, y is balance
pub fn chart_data(points: &[BalancePoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|p| (p.timestamp.timestamp() as f64, p.balance))
        .collect()
}

/// `[min, max]` of one coordinate, widened so the range is never empty
fn axis_bounds(values: impl Iterator<Item = f64>, min_span: f64) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((hi - lo) * 0.05).max(min_span / 2.0);
    [lo - pad, hi + pad]
}

pub fn x_bounds(data: &[(f64, f64)]) -> [f64; 2] {
    // one hour either side when every point shares a timestamp
    axis_bounds(data.iter().map(|(x, _)| *x), 7200.0)
}

pub fn y_bounds(data: &[(f64, f64)]) -> [f64; 2] {
    axis_bounds(data.iter().map(|(_, y)| *y), 1e-6)
}

fn time_label(secs: f64) -> String {
    chrono::DateTime::from_timestamp(secs.round() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn build_chart<'a>(data: &'a [(f64, f64)]) -> Chart<'a> {
    let [x_min, x_max] = x_bounds(data);
    let [y_min, y_max] = y_bounds(data);
    let x_mid = (x_min + x_max) / 2.0;
    let y_mid = (y_min + y_max) / 2.0;

    let dataset = Dataset::default()
        .name("balance")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(data);

    Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(CHART_TITLE)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .title(X_AXIS_TITLE)
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(time_label(x_min)),
                    Span::raw(time_label(x_mid)),
                    Span::raw(time_label(x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Y_AXIS_TITLE)
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.4}", y_min)),
                    Span::styled(
                        format!("{:.4}", y_mid),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("{:.4}", y_max)),
                ]),
        )
}

/// Draw the chart into an off-screen buffer of `width` x `height` cells
pub fn render_to_buffer(points: &[BalancePoint], width: u16, height: u16) -> Result<Buffer> {
    if points.is_empty() {
        return Err(HistoryError::RenderError(
            "No balance points to plot".to_string(),
        ));
    }
    let area = Rect::new(0, 0, width.max(MIN_WIDTH), height.max(MIN_HEIGHT));
    let mut buffer = Buffer::empty(area);
    let data = chart_data(points);
    build_chart(&data).render(area, &mut buffer);
    Ok(buffer)
}

/// Plain-text rows of a rendered buffer, trailing blanks trimmed
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer.get(x, y).symbol());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn render_to_string(points: &[BalancePoint], width: u16, height: u16) -> Result<String> {
    Ok(buffer_to_string(&render_to_buffer(points, width, height)?))
}

/// Full-screen chart until `q` or `Esc` is pressed
pub fn show_interactive(points: &[BalancePoint]) -> Result<()> {
    if points.is_empty() {
        return Err(HistoryError::RenderError(
            "No balance points to plot".to_string(),
        ));
    }
    let data = chart_data(points);

    with_restore(
        enable_raw_mode,
        || run_chart_screen(&data),
        || {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)
        },
    )
}

/// Run `body` after `setup` succeeds; `restore` runs on every path after
/// that, including a failed `body`. The body's error wins over the restore's.
fn with_restore<T>(
    setup: impl FnOnce() -> io::Result<()>,
    body: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T> {
    setup()?;
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn run_chart_screen(data: &[(f64, f64)]) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    loop {
        terminal.draw(|f| f.render_widget(build_chart(data), f.size()))?;
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    return Ok(());
                }
            }
        }
    }
}
