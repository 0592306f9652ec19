use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{dashboard, quiz, topics};
use super::{App, View};
use crate::session::QuizState;

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_help_bar(f, app, chunks[2]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles = vec!["Dashboard", "Topics", "Quiz"];
    let selected = match app.view {
        View::Dashboard => 0,
        View::Topics => 1,
        View::Quiz => 2,
    };

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" MathBubble "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Dashboard => dashboard::draw(f, app, area),
        View::Topics => topics::draw(f, app, area),
        View::Quiz => quiz::draw(f, app, area),
    }
}

fn key<'a>(keys: &'a str, action: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(keys, Style::default().fg(Color::Cyan)),
        Span::raw(action),
    ]
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans: Vec<Span> = Vec::new();

    match app.view {
        View::Dashboard => {
            spans.extend(key("p", " Practice  "));
            spans.extend(key("t", " Training  "));
            spans.extend(key("h/l", " Views  "));
            spans.extend(key("^r", " Refresh  "));
            spans.extend(key("q", " Quit"));
        }
        View::Topics => {
            spans.extend(key("j/k", " Nav  "));
            spans.extend(key("h/l", " Views  "));
            spans.extend(key("p/t", " Play  "));
            spans.extend(key("q", " Quit"));
        }
        View::Quiz => match app.quiz {
            Some(QuizState::InProgress(_)) => {
                spans.extend(key("j/k 1-9", " Select  "));
                spans.extend(key("<CR>", " Check  "));
                spans.extend(key("<Esc>", " Quit quiz"));
            }
            _ => {
                spans.extend(key("r", " Restart  "));
                spans.extend(key("<Esc>", " Dashboard"));
            }
        },
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(help, area);
}
