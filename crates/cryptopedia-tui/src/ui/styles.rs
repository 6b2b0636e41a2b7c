use ratatui::style::{Color, Modifier, Style};

use cryptopedia_core::models::RvolTier;
use cryptopedia_core::notify::Severity;

// Color palette
pub const PRIMARY: Color = Color::Rgb(56, 189, 248);
pub const UP: Color = Color::Rgb(34, 197, 94);
pub const DOWN: Color = Color::Rgb(239, 68, 68);
pub const ACCENT: Color = Color::Rgb(250, 204, 21);
pub const SURGE: Color = Color::Rgb(249, 115, 22);
pub const MUTED: Color = Color::Rgb(128, 128, 140);
pub const HIGHLIGHT: Color = Color::Rgb(40, 44, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(UP)
}

pub fn error_style() -> Style {
    Style::default().fg(DOWN)
}

/// Green for gains, red for losses.
pub fn change_style(positive: bool) -> Style {
    if positive {
        success_style()
    } else {
        error_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(24, 26, 36)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn tier_style(tier: RvolTier) -> Style {
    match tier {
        RvolTier::Surge => Style::default().fg(SURGE).add_modifier(Modifier::BOLD),
        RvolTier::Elevated => Style::default().fg(ACCENT),
        RvolTier::Normal => Style::default().fg(PRIMARY),
    }
}

pub fn toast_style(severity: Severity) -> Style {
    match severity {
        Severity::Success => Style::default().fg(UP),
        Severity::Info => Style::default().fg(PRIMARY),
        Severity::Error => Style::default().fg(DOWN),
    }
}
