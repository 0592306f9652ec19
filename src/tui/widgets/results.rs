use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::accuracy_color;
use crate::error::ErrorKind;
use crate::session::QuizSummary;

fn row<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<16}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn headline(text: &str, color: Color) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn render(f: &mut Frame, title: &str, color: Color, lines: Vec<Line>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(color));
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, area);
}

pub fn draw_completed(f: &mut Frame, summary: &QuizSummary, area: Rect) {
    let lines = vec![
        headline("Quiz Complete!", Color::Green),
        Line::from(""),
        row(
            "Score",
            format!(
                "{}/{} ({}%)",
                summary.score, summary.total_questions, summary.percentage
            ),
            accuracy_color(summary.percentage),
        ),
        row("Correct", summary.score.to_string(), Color::Green),
        row("Wrong", summary.wrong_answers().to_string(), Color::Red),
        row("Time", summary.elapsed_display(), Color::Cyan),
        row("Lives left", summary.lives_remaining.to_string(), Color::Red),
        Line::from(""),
        Line::from(Span::styled(
            "r play again   Esc dashboard",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render(f, summary.mode.label(), Color::Green, lines, area);
}

pub fn draw_game_over(f: &mut Frame, summary: &QuizSummary, area: Rect) {
    let lines = vec![
        headline("Game Over", Color::Red),
        Line::from(""),
        row(
            "Score",
            format!("{}/{}", summary.score, summary.questions_attempted),
            Color::Yellow,
        ),
        row(
            "Reached",
            format!(
                "question {} of {}",
                summary.questions_attempted, summary.total_questions
            ),
            Color::White,
        ),
        row("Time", summary.elapsed_display(), Color::Cyan),
        Line::from(""),
        Line::from(Span::styled(
            "r try again   Esc dashboard",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render(f, summary.mode.label(), Color::Red, lines, area);
}

pub fn draw_error(f: &mut Frame, kind: ErrorKind, area: Rect) {
    let (title, color) = match kind {
        ErrorKind::NoWeakTopics => ("Training Mode", Color::Yellow),
        _ => ("Error", Color::Red),
    };
    let lines = vec![
        headline(kind.user_message(), color),
        Line::from(""),
        Line::from(Span::styled(
            "r retry   Esc dashboard",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render(f, title, color, lines, area);
}
