use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::{accuracy_bar, accuracy_color, truncate};
use crate::stats::NO_DATA;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Stats + modes row
            Constraint::Min(0),    // Weak topics
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_stats(f, app, top_chunks[0]);
    draw_modes(f, app, top_chunks[1]);
    draw_weak_topics(f, app, chunks[1]);
}

fn stat_line<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let weakest_color = if stats.weakest_topic == NO_DATA {
        Color::DarkGray
    } else {
        Color::Red
    };

    let text = vec![
        stat_line(
            "Questions answered: ",
            stats.total_questions.to_string(),
            Color::White,
        ),
        stat_line(
            "Accuracy: ",
            format!("{}%", stats.accuracy_rate),
            accuracy_color(stats.accuracy_rate),
        ),
        stat_line(
            "Current streak: ",
            stats.current_streak.to_string(),
            Color::Cyan,
        ),
        stat_line("Weakest topic: ", stats.weakest_topic.clone(), weakest_color),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_modes(f: &mut Frame, app: &App, area: Rect) {
    let who = if app.user.is_guest {
        Line::from(Span::styled(
            "Playing as guest, progress is not saved",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(vec![
            Span::styled("Signed in as ", Style::default().fg(Color::Gray)),
            Span::styled(app.user.id.as_str(), Style::default().fg(Color::White)),
        ])
    };

    let text = vec![
        Line::from(vec![
            Span::styled("p ", Style::default().fg(Color::Cyan)),
            Span::raw("Practice Mode  "),
            Span::styled(
                format!("{} questions from the whole pool", app.config().questions_per_quiz),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled("t ", Style::default().fg(Color::Cyan)),
            Span::raw("Training Mode  "),
            Span::styled("focus on weak topics", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        who,
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Play ")
        .title_style(Style::default().fg(Color::Yellow));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_weak_topics(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Needs Practice ")
        .title_style(Style::default().fg(Color::Magenta));

    if app.weak_topics.is_empty() {
        let hint = if app.stats.has_data() {
            "No weak topics, nice work!"
        } else {
            "Answer a few questions to find your weak spots."
        };
        let paragraph = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .weak_topics
        .iter()
        .enumerate()
        .map(|(i, weak)| {
            let percent = (weak.accuracy * 100.0).round() as u32;
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<24}", truncate(&weak.topic, 22)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(accuracy_bar(percent), Style::default().fg(accuracy_color(percent))),
                Span::styled(
                    format!(" {:>3}% ", percent),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("({} attempts)", weak.attempts),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}
