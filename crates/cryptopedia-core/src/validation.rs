//! Field validation and input acceptance for the auth forms.

use std::sync::OnceLock;

use regex::Regex;

/// Minimum login password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_PASSWORD_LENGTH: usize = 128;
/// "010-1234-5678" is the longest accepted phone form.
pub const MAX_PHONE_LENGTH: usize = 13;
pub const MAX_COMMENT_LENGTH: usize = 500;

pub const INVALID_EMAIL: &str = "Invalid email address";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const INVALID_PHONE: &str = "Invalid phone number";
pub const COMMENT_TOO_LONG: &str = "Comment must be at most 500 characters";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .unwrap_or_else(|e| panic!("email pattern is invalid: {e}"))
    })
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^01[0-9]-?[0-9]{3,4}-?[0-9]{4}$")
            .unwrap_or_else(|e| panic!("phone pattern is invalid: {e}"))
    })
}

/// Standard email grammar: no leading dot, no consecutive dots.
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && email_regex().is_match(email)
}

/// National mobile number, with or without dashes. Empty means "not given".
pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_empty() || phone_regex().is_match(phone)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

pub fn is_valid_comment(comment: &str) -> bool {
    comment.chars().count() <= MAX_COMMENT_LENGTH
}

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character may be appended to a field holding `current_len` chars
pub fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}
