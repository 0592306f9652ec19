use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{accuracy_bar, accuracy_color, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .topics
        .items
        .iter()
        .map(|stat| {
            let percent = stat.accuracy_percent();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<30}", truncate(&stat.topic, 28)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(accuracy_bar(percent), Style::default().fg(accuracy_color(percent))),
                Span::styled(
                    format!(" {:>3}%  ", percent),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("{}/{}", stat.correct, stat.total),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Topics ")
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<30}", "Topic"), header_style),
        Span::styled(format!("{:<17}", "Accuracy"), header_style),
        Span::styled("Correct", header_style),
    ]);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.topics.selected);

    let inner = block.inner(area);
    f.render_widget(block, area);

    // Header takes the first row inside the border
    let header_area = Rect { height: 1, ..inner };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        y: inner.y + 1,
        height: inner.height.saturating_sub(1),
        ..inner
    };
    f.render_stateful_widget(list, list_area, &mut state);
}
