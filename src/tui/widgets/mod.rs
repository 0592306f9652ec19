pub mod dashboard;
pub mod quiz;
pub mod results;
pub mod topics;

use ratatui::style::Color;

/// Ten-cell bar for a 0-100 percentage.
pub fn accuracy_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize + 5) / 10;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

pub fn accuracy_color(percent: u32) -> Color {
    match percent {
        80..=100 => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
