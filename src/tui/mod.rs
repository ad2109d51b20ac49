//! Ratatui-based terminal preview of a rendered chart.
//!
//! The preview shows the same lines, reference lines and bands as the HTML
//! artifact, starting from the chart's first view. `+`/`-` zoom the x-axis,
//! arrows pan, `Tab` cycles through the named views and `q`/`Esc` quit.

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
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::error::AppError;
use crate::render::{ChartSpec, Rgb, ViewSpec};

mod plotters_chart;

use plotters_chart::PreviewChart;

const ZOOM_STEP: f64 = 0.8;
const PAN_STEP: f64 = 0.1;

/// Show `spec` in the terminal until the user quits.
pub fn preview(spec: &ChartSpec) -> Result<(), AppError> {
    let mut viewport = Viewport::new(spec)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    event_loop(&mut terminal, spec, &mut viewport)
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

/// Current axis ranges and which named view they started from.
#[derive(Debug, Clone, PartialEq)]
struct Viewport {
    views: Vec<ViewSpec>,
    index: usize,
    x: (f64, f64),
    y: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    ZoomIn,
    ZoomOut,
    Pan(i8, i8),
    NextView,
    Reset,
}

impl Viewport {
    fn new(spec: &ChartSpec) -> Result<Self, AppError> {
        let first = spec
            .views
            .first()
            .ok_or_else(|| AppError::render("Chart has no views to preview."))?;
        Ok(Self {
            views: spec.views.clone(),
            index: 0,
            x: first.x,
            y: first.y,
        })
    }

    fn current(&self) -> ViewSpec {
        ViewSpec {
            name: self.views[self.index].name.clone(),
            x: self.x,
            y: self.y,
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => {}
            Action::ZoomIn => self.zoom(ZOOM_STEP),
            Action::ZoomOut => self.zoom(1.0 / ZOOM_STEP),
            Action::Pan(dx, dy) => {
                let sx = (self.x.1 - self.x.0) * PAN_STEP * dx as f64;
                let sy = (self.y.1 - self.y.0) * PAN_STEP * dy as f64;
                self.x = (self.x.0 + sx, self.x.1 + sx);
                self.y = (self.y.0 + sy, self.y.1 + sy);
            }
            Action::NextView => {
                self.index = (self.index + 1) % self.views.len();
                self.reset();
            }
            Action::Reset => self.reset(),
        }
    }

    fn zoom(&mut self, factor: f64) {
        let mid = (self.x.0 + self.x.1) / 2.0;
        let half = (self.x.1 - self.x.0) / 2.0 * factor;
        if half > 1e-9 {
            self.x = (mid - half, mid + half);
        }
    }

    fn reset(&mut self) {
        let v = &self.views[self.index];
        self.x = v.x;
        self.y = v.y;
    }
}

fn key_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::ZoomIn),
        KeyCode::Char('-') => Some(Action::ZoomOut),
        KeyCode::Left => Some(Action::Pan(-1, 0)),
        KeyCode::Right => Some(Action::Pan(1, 0)),
        KeyCode::Up => Some(Action::Pan(0, 1)),
        KeyCode::Down => Some(Action::Pan(0, -1)),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::Char('r') => Some(Action::Reset),
        _ => None,
    }
}

fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    spec: &ChartSpec,
    viewport: &mut Viewport,
) -> Result<(), AppError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal
                .draw(|f| draw(f, spec, viewport))
                .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
            needs_redraw = false;
        }

        if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::terminal(format!("Event poll error: {e}")))? {
            continue;
        }

        match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key_action(key.code) {
                    Some(Action::Quit) => break,
                    Some(action) => {
                        viewport.apply(action);
                        needs_redraw = true;
                    }
                    None => {}
                }
            }
            Event::Resize(_, _) => needs_redraw = true,
            _ => {}
        }
    }
    Ok(())
}

fn draw(frame: &mut ratatui::Frame<'_>, spec: &ChartSpec, viewport: &Viewport) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(8), Constraint::Length(3)])
        .split(frame.area());

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            spec.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            spec.subtitle.as_deref().unwrap_or(""),
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(title, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(28)])
        .split(chunks[1]);

    let view = viewport.current();
    let block = Block::default().borders(Borders::ALL).title(view.name.clone());
    let inner = block.inner(body[0]);
    frame.render_widget(block, body[0]);
    frame.render_widget(PreviewChart { spec, view }, inner);

    draw_legend(frame, spec, body[1]);

    let help = "+/- zoom  ←/→/↑/↓ pan  Tab view  r reset  q quit";
    let range = format!(
        "x: {} .. {}",
        spec.x_kind.label(viewport.x.0),
        spec.x_kind.label(viewport.x.1)
    );
    let footer = Paragraph::new(Line::from(vec![
        Span::styled(help, Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled(range, Style::default().fg(Color::Yellow)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);
}

fn draw_legend(frame: &mut ratatui::Frame<'_>, spec: &ChartSpec, area: Rect) {
    let lines: Vec<Line> = spec
        .lines
        .iter()
        .map(|l| {
            let color = match l.color {
                Rgb(0, 0, 0) => Color::White,
                Rgb(r, g, b) => Color::Rgb(r, g, b),
            };
            Line::from(vec![
                Span::styled("━━ ", Style::default().fg(color)),
                Span::raw(l.label.as_str()),
            ])
        })
        .collect();
    let legend = Paragraph::new(lines).block(Block::default().title("Legend").borders(Borders::ALL));
    frame.render_widget(legend, area);
}
