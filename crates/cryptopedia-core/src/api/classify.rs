//! Inbound response classification.
//!
//! Every settled request is described as an [`Outcome`] and run through
//! [`CLASSIFIERS`] in order. The first classifier that matches decides the
//! [`Verdict`]; a request nobody claims passes through unchanged.

use serde_json::Value;

use super::error::{ApiError, DEFAULT_VALIDATION_MESSAGE};

/// What came back from the transport.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// No response was received at all.
    NoResponse { detail: &'a str },
    /// A response with a status line. `body` is only read for non-2xx.
    Response { status: u16, body: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Reject(ApiError),
}

/// A named, pure classification step.
pub struct Classifier {
    pub name: &'static str,
    apply: fn(&Outcome<'_>) -> Option<Verdict>,
}

impl Classifier {
    pub fn apply(&self, outcome: &Outcome<'_>) -> Option<Verdict> {
        (self.apply)(outcome)
    }
}

/// Classification order. First match wins.
pub const CLASSIFIERS: [Classifier; 5] = [
    Classifier { name: "network", apply: classify_network },
    Classifier { name: "auth", apply: classify_auth },
    Classifier { name: "client-error", apply: classify_client_error },
    Classifier { name: "server-error", apply: classify_server_error },
    Classifier { name: "success", apply: classify_success },
];

/// Run the classifier list over an outcome.
pub fn classify(outcome: &Outcome<'_>) -> Verdict {
    CLASSIFIERS
        .iter()
        .find_map(|c| c.apply(outcome))
        .unwrap_or(Verdict::Pass)
}

fn classify_network(outcome: &Outcome<'_>) -> Option<Verdict> {
    match outcome {
        Outcome::NoResponse { detail } => {
            Some(Verdict::Reject(ApiError::Network(detail.to_string())))
        }
        Outcome::Response { .. } => None,
    }
}

fn classify_auth(outcome: &Outcome<'_>) -> Option<Verdict> {
    match outcome {
        Outcome::Response { status: status @ (401 | 403), .. } => {
            Some(Verdict::Reject(ApiError::Auth { status: *status }))
        }
        _ => None,
    }
}

fn classify_client_error(outcome: &Outcome<'_>) -> Option<Verdict> {
    match outcome {
        Outcome::Response { status: status @ 400..=499, body } => {
            Some(Verdict::Reject(ApiError::Validation {
                status: *status,
                message: extract_message(body),
            }))
        }
        _ => None,
    }
}

fn classify_server_error(outcome: &Outcome<'_>) -> Option<Verdict> {
    match outcome {
        Outcome::Response { status: status @ 500..=599, .. } => {
            Some(Verdict::Reject(ApiError::Server { status: *status }))
        }
        _ => None,
    }
}

fn classify_success(outcome: &Outcome<'_>) -> Option<Verdict> {
    match outcome {
        Outcome::Response { status: 200..=299, .. } => Some(Verdict::Pass),
        _ => None,
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `error.message`, then `message`, then falls back to
/// [`DEFAULT_VALIDATION_MESSAGE`]. Blank strings count as absent.
pub fn extract_message(body: &str) -> String {
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    ["/error/message", "/message"]
        .iter()
        .filter_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .find(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_VALIDATION_MESSAGE.to_string())
}
