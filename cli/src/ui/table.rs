use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::{ACCENT, BORDER, MUTED};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let projection = &app.snapshot.projection;

    let header = Row::new(vec![
        "#",
        "Period",
        "Avg Volt",
        "Avg Amp",
        "Avg Watts",
        "Max W",
        "Min W",
        "Samples",
        "Total Wh",
    ])
    .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = projection
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                Span::styled(row.index.to_string(), Style::default().fg(MUTED)),
                Span::raw(row.period_label.clone()),
                Span::raw(row.average_volt_cell()),
                Span::raw(row.average_current_cell()),
                Span::raw(row.average_watts_cell()),
                Span::raw(row.max_watts_cell()),
                Span::raw(row.min_watts_cell()),
                Span::raw(row.record.total_count.to_string()),
                Span::styled(
                    row.total_watt_hours_cell(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(18),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Periods ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(BORDER)),
    );

    frame.render_widget(table, area);
}
