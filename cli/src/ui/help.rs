use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::{centered_rect, ACCENT, MUTED, VERSION};

pub fn render(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 50, 60);
    frame.render_widget(Clear, area);

    let key_style = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(MUTED);
    let key_line = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), key_style),
            Span::styled(desc, desc_style),
        ])
    };

    let lines = vec![
        Line::from(""),
        key_line("1-6", "Jump to a granularity"),
        key_line("←/h  →/l", "Previous / next granularity"),
        key_line("r", "Refresh now"),
        key_line("?", "Toggle this help"),
        key_line("q / Esc", "Quit"),
        Line::from(""),
        Line::from(Span::styled(
            format!("plugwatch v{VERSION}"),
            Style::default().fg(MUTED),
        ))
        .centered(),
    ];

    let popup = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(popup, area);
}
