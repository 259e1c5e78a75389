mod chart;
mod help;
mod status_bar;
mod summary;
mod table;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use plugwatch_protocol::GRANULARITIES;

use crate::app::{App, AppView};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Fixed palette; this dashboard has no theming layer.
pub(crate) const ACCENT: Color = Color::Cyan;
pub(crate) const MUTED: Color = Color::DarkGray;
pub(crate) const WARNING: Color = Color::Yellow;
pub(crate) const DANGER: Color = Color::Red;
pub(crate) const SUCCESS: Color = Color::Green;
pub(crate) const BORDER: Color = Color::DarkGray;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(5),
            Constraint::Length(12),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_granularity_tabs(frame, chunks[0], app);
    summary::render(frame, chunks[1], app);
    chart::render(frame, chunks[2], app);
    table::render(frame, chunks[3], app);
    status_bar::render(frame, chunks[4], app);

    if app.view == AppView::Help {
        help::render(frame);
    }
}

fn render_granularity_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let tabs: Vec<Span> = GRANULARITIES
        .iter()
        .enumerate()
        .flat_map(|(i, &g)| {
            let is_selected = g == app.snapshot.granularity;
            let style = if is_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            vec![
                Span::styled(format!(" {} {} ", i + 1, g.label()), style),
                Span::raw(" "),
            ]
        })
        .collect();

    let tabs_para = Paragraph::new(vec![Line::from(""), Line::from(tabs)]).centered();
    frame.render_widget(tabs_para, area);
}

/// Centers a popup of the given percentage size within `area`.
pub(crate) fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let popup_width = area.width * width_percent / 100;
    let popup_height = area.height * height_percent / 100;
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(x, y, popup_width, popup_height)
}
