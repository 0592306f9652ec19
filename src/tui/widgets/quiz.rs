use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::results;
use crate::models::Question;
use crate::session::{ActiveQuiz, Feedback, QuizState};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    match &app.quiz {
        Some(QuizState::InProgress(quiz)) => draw_active(f, app, quiz, area),
        Some(QuizState::Completed(summary)) => results::draw_completed(f, summary, area),
        Some(QuizState::GameOver(summary)) => results::draw_game_over(f, summary, area),
        Some(QuizState::Errored(kind)) => results::draw_error(f, *kind, area),
        Some(QuizState::Loading) | None => draw_message(f, "Loading questions...", area),
    }
}

fn draw_message(f: &mut Frame, message: &str, area: Rect) {
    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn draw_active(f: &mut Frame, app: &App, quiz: &ActiveQuiz, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Mode, topic, lives
            Constraint::Length(1), // Progress
            Constraint::Min(5),    // Prompt
            Constraint::Length(quiz.current_question().options.len() as u16 + 2),
            Constraint::Length(1), // Feedback
        ])
        .split(area);

    draw_header(f, app, quiz, chunks[0]);
    draw_progress(f, quiz, chunks[1]);
    draw_prompt(f, quiz.current_question(), chunks[2]);
    draw_options(f, quiz, chunks[3]);
    draw_feedback(f, app, quiz, chunks[4]);
}

fn hearts(remaining: u32, max: u32) -> String {
    let lost = max.saturating_sub(remaining) as usize;
    format!("{}{}", "♥".repeat(remaining as usize), "♡".repeat(lost))
}

fn draw_header(f: &mut Frame, app: &App, quiz: &ActiveQuiz, area: Rect) {
    let question = quiz.current_question();
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", question.topic),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            hearts(quiz.lives_remaining, app.config().max_lives),
            Style::default().fg(Color::Red),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", quiz.mode.label()))
        .title_style(Style::default().fg(Color::Yellow));

    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_progress(f: &mut Frame, quiz: &ActiveQuiz, area: Rect) {
    let (position, total) = quiz.progress();
    let ratio = position as f64 / total.max(1) as f64;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}/{}", position, total));
    f.render_widget(gauge, area);
}

fn draw_prompt(f: &mut Frame, question: &Question, area: Rect) {
    let paragraph = Paragraph::new(question.prompt.as_str())
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" Question "));
    f.render_widget(paragraph, area);
}

// Highlight for one option given the current selection and feedback
fn option_style(index: usize, selected: Option<usize>, feedback: Option<Feedback>) -> Style {
    let base = Style::default().fg(Color::White);
    match feedback {
        Some(Feedback::Correct { selected: s }) if s == index => base
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        Some(Feedback::Incorrect { selected: s }) if s == index => base
            .fg(Color::Black)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        Some(Feedback::Revealed { correct, .. }) if correct == index => base
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        Some(Feedback::Revealed { selected: s, .. }) if s == index => {
            base.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT)
        }
        _ if selected == Some(index) => base.bg(Color::DarkGray).add_modifier(Modifier::BOLD),
        _ => base,
    }
}

fn draw_options(f: &mut Frame, quiz: &ActiveQuiz, area: Rect) {
    let selected = quiz.current_answer();
    let items: Vec<ListItem> = quiz
        .current_question()
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let marker = if selected == Some(i) { "> " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{}. ", Question::option_letter(i)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(option.as_str(), option_style(i, selected, quiz.feedback)),
            ]))
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(" Options ");
    f.render_widget(List::new(items).block(block), area);
}

fn draw_feedback(f: &mut Frame, app: &App, quiz: &ActiveQuiz, area: Rect) {
    let line = match quiz.feedback {
        Some(Feedback::Correct { .. }) => {
            Span::styled("Correct!", Style::default().fg(Color::Green))
        }
        Some(Feedback::Incorrect { .. }) if quiz.lives_remaining == 0 => {
            Span::styled("Out of lives!", Style::default().fg(Color::Red))
        }
        Some(Feedback::Incorrect { .. }) => Span::styled(
            format!(
                "Not quite, try again ({}/{} attempts)",
                quiz.attempts_on_current,
                app.config().max_attempts_per_question
            ),
            Style::default().fg(Color::Red),
        ),
        Some(Feedback::Revealed { correct, .. }) => Span::styled(
            format!("The answer was {}", Question::option_letter(correct)),
            Style::default().fg(Color::Yellow),
        ),
        None if quiz.current_answer().is_some() => {
            Span::styled("Press Enter to check", Style::default().fg(Color::DarkGray))
        }
        None => Span::styled(
            "Pick an answer with j/k or 1-9",
            Style::default().fg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(Line::from(line)), area);
}
