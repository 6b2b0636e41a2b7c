use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use cryptopedia_core::auth::flow::{COMMENT, EMAIL, PASSWORD, PHONE_NUMBER};
use cryptopedia_core::auth::{FormState, SignupModal};
use cryptopedia_core::navigation::Route;
use cryptopedia_core::notify::Severity;

use crate::app::{App, AppState, LoginFocus, SignupFocus};

use super::dashboard;
use super::styles;

const LOGO: [&str; 3] = [
    "  ╔═╗╦═╗╦ ╦╔═╗╔╦╗╔═╗╔═╗╔═╗╔╦╗╦╔═╗",
    "  ║  ╠╦╝╚╦╝╠═╝ ║ ║ ║╠═╝║╣  ║║║╠═╣",
    "  ╚═╝╩╚═ ╩ ╩   ╩ ╚═╝╩  ╚═╝═╩╝╩╩ ╩",
];

/// Visible width of a text input
const FIELD_WIDTH: usize = 28;

/// Most toasts shown at once
const MAX_TOASTS: usize = 3;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.screen {
        Route::Dashboard => dashboard::render(frame, app, chunks[1]),
        Route::Login => render_login_screen(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if app.screen == Route::Login {
        match app.signup.modal() {
            SignupModal::Form => render_signup_overlay(frame, app),
            SignupModal::Confirmation => render_confirmation_overlay(frame),
            SignupModal::Closed => {}
        }
        let error = app
            .signup
            .error_modal()
            .or_else(|| app.login.error_modal());
        if let Some(message) = error {
            render_error_overlay(frame, message);
        }
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }

    render_toasts(frame, app);
}

/// Placeholder shown until the session has been hydrated.
pub fn render_initializing(frame: &mut Frame) {
    let area = centered_rect_fixed(30, 3, frame.area());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "     Initializing...",
        styles::muted_style(),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Cryptopedia";
    let hint = match app.screen {
        Route::Dashboard => "[r] Reload  [l] Logout  [q] Quit",
        Route::Login => "[Esc] Quit",
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(format!("  {}", app.screen.title()), styles::muted_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len() + app.screen.title().len() + hint.len() + 6),
        )),
        Span::styled(hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.screen {
        Route::Dashboard if app.snapshot_loading => " Loading market data...".to_string(),
        Route::Dashboard => match (&app.snapshot_error, &app.snapshot) {
            (Some(error), _) => format!(" Market data unavailable: {}", error),
            (None, Some(snapshot)) => format!(
                " {} symbols, {} tickers",
                snapshot.symbols.len(),
                snapshot.tickers.len()
            ),
            (None, None) => " Demo data".to_string(),
        },
        Route::Login => " Not signed in".to_string(),
    };
    let right_text = format!(" {} ", app.api.base_url());

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

/// One labelled input row, with its validation message underneath if any.
fn field_lines(
    label: &str,
    value: &str,
    masked: bool,
    focused: bool,
    error: Option<&str>,
) -> Vec<Line<'static>> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown: String = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    // Keep the tail visible when the value is longer than the box
    let skip = shown.chars().count().saturating_sub(FIELD_WIDTH);
    let visible: String = shown.chars().skip(skip).collect();
    let cursor = if focused { "▌" } else { " " };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("  {:<10}[", label), styles::muted_style()),
        Span::styled(format!("{:<w$}{}", visible, cursor, w = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])];
    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            format!("            {}", message),
            styles::error_style(),
        )));
    }
    lines
}

fn button_line(label: &str, focused: bool, indent: usize) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::raw(format!("{}[", " ".repeat(indent))),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn form_error_count(form: &FormState) -> u16 {
    form.errors().len() as u16
}

fn render_login_screen(frame: &mut Frame, app: &App, area: Rect) {
    let form = app.login.form();
    let height = 13 + form_error_count(form);
    let box_area = centered_rect_fixed(48, height, area);

    let mut lines = logo_lines();
    lines.push(Line::from(Span::styled(
        "        Market intelligence terminal",
        styles::muted_style(),
    )));
    lines.push(Line::from(""));

    lines.extend(field_lines(
        "Email:",
        form.value(EMAIL),
        false,
        app.login_focus == LoginFocus::Email,
        form.error(EMAIL),
    ));
    lines.extend(field_lines(
        "Password:",
        form.value(PASSWORD),
        true,
        app.login_focus == LoginFocus::Password,
        form.error(PASSWORD),
    ));
    lines.push(Line::from(""));

    let label = if form.is_submitting() {
        "Logging in..."
    } else {
        "Login"
    };
    lines.push(button_line(label, app.login_focus == LoginFocus::Button, 14));
    lines.push(Line::from(""));

    let request_style = if app.login_focus == LoginFocus::RequestAccess {
        styles::selected_style()
    } else {
        styles::highlight_style()
    };
    lines.push(Line::from(vec![
        Span::styled("      No account? ", styles::muted_style()),
        Span::styled("Request access", request_style),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(!app.login_modal_open()))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

fn render_signup_overlay(frame: &mut Frame, app: &App) {
    let form = app.signup.form();
    let height = 12 + form_error_count(form);
    let area = centered_rect_fixed(52, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let focus = app.signup_focus;
    let mut lines = vec![
        Line::from(Span::styled(" Request access", styles::title_style())),
        Line::from(Span::styled(
            " We will contact you once your account is approved.",
            styles::muted_style(),
        )),
        Line::from(""),
    ];
    lines.extend(field_lines(
        "Email:",
        form.value(EMAIL),
        false,
        focus == SignupFocus::Email,
        form.error(EMAIL),
    ));
    lines.extend(field_lines(
        "Phone:",
        form.value(PHONE_NUMBER),
        false,
        focus == SignupFocus::Phone,
        form.error(PHONE_NUMBER),
    ));
    lines.extend(field_lines(
        "Comment:",
        form.value(COMMENT),
        false,
        focus == SignupFocus::Comment,
        form.error(COMMENT),
    ));
    lines.push(Line::from(""));

    let label = if form.is_submitting() {
        "Submitting..."
    } else {
        "Submit"
    };
    lines.push(button_line(label, focus == SignupFocus::Button, 16));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  Press ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.signup.error_modal().is_none()))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirmation_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(" Request received", styles::success_style())),
        Line::from(""),
        Line::from(Span::styled(
            " Your signup request has been submitted. We will",
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            " review it and get back to you by email.",
            styles::list_item_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::success_style());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_error_overlay(frame: &mut Frame, message: &str) {
    let area = centered_rect_fixed(48, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(" Something went wrong", styles::error_style())),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", message), styles::list_item_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" to try again", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::error_style());

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_toasts(frame: &mut Frame, app: &App) {
    let active = app.notifications.active(Utc::now());
    let full = frame.area();
    let width = 44.min(full.width);

    for (i, toast) in active.iter().rev().take(MAX_TOASTS).enumerate() {
        let y = full.y + 1 + (i as u16) * 3;
        if y + 3 > full.y + full.height {
            break;
        }
        let area = Rect::new(full.x + full.width - width, y, width, 3);
        frame.render_widget(Clear, area);

        let icon = match toast.severity {
            Severity::Success => "✓",
            Severity::Info => "i",
            Severity::Error => "✗",
        };
        let style = styles::toast_style(toast.severity);
        let block = Block::default().borders(Borders::ALL).border_style(style);
        let line = Line::from(vec![
            Span::styled(format!(" {} ", icon), style),
            Span::styled(toast.message.clone(), styles::list_item_style()),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 9, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let outer = Rect::new(0, 0, 40, 10);
        let r = centered_rect_fixed(20, 4, outer);
        assert_eq!(r, Rect::new(10, 3, 20, 4));

        let r = centered_rect_fixed(80, 40, outer);
        assert_eq!(r, Rect::new(0, 0, 40, 10));
    }

    #[test]
    fn test_password_field_is_masked() {
        let lines = field_lines("Password:", "hunter22", true, false, None);
        let text: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("********"));
        assert!(!text.contains("hunter22"));
    }

    #[test]
    fn test_field_error_adds_line() {
        let lines = field_lines("Email:", "x", false, true, Some("Invalid email address"));
        assert_eq!(lines.len(), 2);
    }
}
