//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use cryptopedia_core::auth::SignupModal;
use cryptopedia_core::navigation::Route;

use crate::app::{App, AppState, LoginFocus, SignupFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    match app.screen {
        Route::Login => handle_login_screen_input(app, key),
        Route::Dashboard => handle_dashboard_input(app, key),
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('l') => app.logout(),
        KeyCode::Char('r') => app.load_dashboard(),
        _ => {}
    }
    false
}

/// Modals capture input in stacking order: error, confirmation, signup form.
fn handle_login_screen_input(app: &mut App, key: KeyEvent) -> bool {
    if app.signup.error_modal().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.signup.dismiss_error();
        }
        return false;
    }
    if app.login.error_modal().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.login.dismiss_error();
        }
        return false;
    }

    match app.signup.modal() {
        SignupModal::Confirmation => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                app.signup.dismiss_confirmation();
            }
            false
        }
        SignupModal::Form => {
            handle_signup_input(app, key);
            false
        }
        SignupModal::Closed => handle_login_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => app.login_focus = app.login_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.login_focus = app.login_focus.prev(),
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email | LoginFocus::Password => {
                app.login_focus = app.login_focus.next();
            }
            LoginFocus::Button => app.submit_login(),
            LoginFocus::RequestAccess => app.open_signup(),
        },
        KeyCode::Backspace => {
            if let (Some(field), Some(form)) = (app.login_focus.field(), app.login.form_mut()) {
                form.pop_char(field);
            }
        }
        KeyCode::Char(c) => {
            if let (Some(field), Some(form)) = (app.login_focus.field(), app.login.form_mut()) {
                form.push_char(field, c);
            }
        }
        _ => {}
    }
    false
}

fn handle_signup_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.signup.close(),
        KeyCode::Down | KeyCode::Tab => app.signup_focus = app.signup_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.signup_focus = app.signup_focus.prev(),
        KeyCode::Enter => match app.signup_focus {
            SignupFocus::Button => app.submit_signup(),
            _ => app.signup_focus = app.signup_focus.next(),
        },
        KeyCode::Backspace => {
            if let (Some(field), Some(form)) = (app.signup_focus.field(), app.signup.form_mut()) {
                form.pop_char(field);
            }
        }
        KeyCode::Char(c) => {
            if let (Some(field), Some(form)) = (app.signup_focus.field(), app.signup.form_mut()) {
                form.push_char(field, c);
            }
        }
        _ => {}
    }
}
