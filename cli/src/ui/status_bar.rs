use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::{DANGER, MUTED, SUCCESS, WARNING};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let hints = Span::styled(
        " 1-6/←→ granularity | r refresh | ? help | q quit ",
        Style::default().fg(MUTED),
    );

    let state = if app.snapshot.loading {
        Span::styled("fetching...", Style::default().fg(WARNING))
    } else if let Some(error) = &app.snapshot.last_error {
        Span::styled(format!("error: {error}"), Style::default().fg(DANGER))
    } else {
        Span::styled("live", Style::default().fg(SUCCESS))
    };

    let line = Line::from(vec![hints, Span::raw(" "), state]);
    frame.render_widget(Paragraph::new(line), area);
}
