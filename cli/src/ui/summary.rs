use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::{ACCENT, BORDER, MUTED};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let projection = &app.snapshot.projection;

    let block = Block::default()
        .title(" Running Total ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));

    let total = Span::styled(
        format!("{:.2} Wh", projection.running_total),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    );
    let detail = Span::styled(
        format!(
            "{} across {} {} periods",
            app.config.endpoint,
            projection.rows.len(),
            app.snapshot.granularity.label().to_lowercase(),
        ),
        Style::default().fg(MUTED),
    );

    let card = Paragraph::new(vec![Line::from(total), Line::from(detail)])
        .centered()
        .block(block);
    frame.render_widget(card, area);
}
