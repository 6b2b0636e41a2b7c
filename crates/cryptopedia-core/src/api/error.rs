use thiserror::Error;

/// Shown when a request never got a response.
pub const CONNECTIVITY_MESSAGE: &str = "Unable to reach the server. Check your connection.";

/// Shown for every 5xx. The body is never surfaced.
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Shown for a 4xx whose body carries no usable message.
pub const DEFAULT_VALIDATION_MESSAGE: &str = "Request failed. Please check your input.";

/// Shown when the session was rejected by the server.
pub const AUTH_ERROR_MESSAGE: &str = "Your session has expired. Please log in again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized (status {status})")]
    Auth { status: u16 },

    #[error("{message}")]
    Validation { status: u16, message: String },

    #[error("Server error (status {status})")]
    Server { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in log lines
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The message a user should see for this error.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => CONNECTIVITY_MESSAGE.to_string(),
            ApiError::Auth { .. } => AUTH_ERROR_MESSAGE.to_string(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
            ApiError::InvalidResponse(_) => DEFAULT_VALIDATION_MESSAGE.to_string(),
        }
    }

    /// HTTP status behind this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Auth { status }
            | ApiError::Validation { status, .. }
            | ApiError::Server { status } => Some(*status),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }
}
