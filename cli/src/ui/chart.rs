use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{ChartMode, ChartSeries};
use crate::ui::{ACCENT, BORDER, MUTED};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let projection = &app.snapshot.projection;

    let block = Block::default()
        .title(format!(" Watt-Hours ({}) ", app.snapshot.granularity.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER));

    if projection.chart.watt_hours.is_empty() {
        let message = if app.snapshot.loading {
            "Fetching samples..."
        } else {
            "No samples yet"
        };
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(MUTED))),
        ])
        .centered()
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    match projection.mode {
        ChartMode::Line => render_line(frame, area, block, &projection.chart),
        ChartMode::Bar => render_bars(frame, area, block, &projection.chart),
    }
}

fn render_line(frame: &mut Frame, area: Rect, block: Block, series: &ChartSeries) {
    let points: Vec<(f64, f64)> = series
        .watt_hours
        .iter()
        .enumerate()
        .map(|(i, &wh)| (i as f64, wh))
        .collect();

    let max_y = series
        .watt_hours
        .iter()
        .fold(0.0_f64, |acc, &wh| acc.max(wh))
        .max(1.0);
    let max_x = (points.len().saturating_sub(1)).max(1) as f64;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(ACCENT))
        .data(&points);

    let first_label = series.labels.first().cloned().unwrap_or_default();
    let last_label = series.labels.last().cloned().unwrap_or_default();

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds([0.0, max_x])
                .labels(vec![
                    Span::styled(first_label, Style::default().fg(MUTED)),
                    Span::styled(last_label, Style::default().fg(MUTED)),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds([0.0, max_y * 1.1])
                .labels(vec![
                    Span::styled("0.00", Style::default().fg(MUTED)),
                    Span::styled(format!("{:.2}", max_y * 1.1), Style::default().fg(MUTED)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn render_bars(frame: &mut Frame, area: Rect, block: Block, series: &ChartSeries) {
    // Bar heights are integers, so carry two decimals through a x100 scale.
    let bars: Vec<Bar> = series
        .watt_hours
        .iter()
        .zip(series.labels.iter())
        .map(|(&wh, label)| {
            Bar::default()
                .value((wh * 100.0).round().max(0.0) as u64)
                .text_value(format!("{wh:.2}"))
                .label(Line::from(label.as_str()))
        })
        .collect();

    let bar_chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(12)
        .bar_gap(1)
        .bar_style(Style::default().fg(ACCENT))
        .value_style(
            Style::default()
                .fg(ratatui::style::Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .label_style(Style::default().fg(MUTED));

    frame.render_widget(bar_chart, area);
}
