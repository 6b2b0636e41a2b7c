//! Login and signup-request form flows.
//!
//! Both flows move `Idle → Validating → Submitting → (Success | Failed)`.
//! A submission is split in three so the front end can run the network call
//! in the background:
//!
//! 1. `begin_submit` validates and, on success, returns the pending request
//! 2. the request's `send` performs exactly one gateway call
//! 3. `finish` applies the outcome to the flow
//!
//! `submit` chains the three for callers that can simply await.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::api::error::{
    ApiError, CONNECTIVITY_MESSAGE, DEFAULT_VALIDATION_MESSAGE, SERVER_ERROR_MESSAGE,
};
use crate::api::ApiClient;
use crate::models::{SignupRequest, TokenPair};
use crate::navigation::Route;
use crate::notify::Notifier;
use crate::validation::{self, MAX_COMMENT_LENGTH, MAX_EMAIL_LENGTH, MAX_PASSWORD_LENGTH, MAX_PHONE_LENGTH};

use super::Session;

pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";
pub const PHONE_NUMBER: &str = "phoneNumber";
pub const COMMENT: &str = "comment";

pub const LOGIN_FAILED_MESSAGE: &str = "Failed to login. Please check your credentials.";
pub const SIGNUP_FAILED_MESSAGE: &str = "Failed to submit request. Please try again.";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Successfully logged in!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

// ============================================================================
// Form state
// ============================================================================

/// Field values, per-field validation errors and the submitting flag.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    fields: BTreeMap<&'static str, String>,
    errors: BTreeMap<&'static str, String>,
    submitting: bool,
}

impl FormState {
    fn with_fields(names: &[&'static str]) -> Self {
        Self {
            fields: names.iter().map(|n| (*n, String::new())).collect(),
            errors: BTreeMap::new(),
            submitting: false,
        }
    }

    pub fn value(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Replace a field's value. Unknown fields are ignored.
    pub fn set(&mut self, field: &str, value: &str) {
        if let Some(slot) = self.fields.get_mut(field) {
            *slot = value.to_string();
            self.errors.remove(field);
        }
    }

    /// Append a typed character if the field accepts it.
    pub fn push_char(&mut self, field: &str, c: char) -> bool {
        let max_len = max_length(field);
        match self.fields.get_mut(field) {
            Some(slot) if validation::can_add_char(slot.chars().count(), max_len, c) => {
                slot.push(c);
                self.errors.remove(field);
                true
            }
            _ => false,
        }
    }

    pub fn pop_char(&mut self, field: &str) {
        if let Some(slot) = self.fields.get_mut(field) {
            slot.pop();
        }
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<&'static str, String> {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn clear_values(&mut self) {
        for value in self.fields.values_mut() {
            value.clear();
        }
        self.errors.clear();
    }
}

fn max_length(field: &str) -> usize {
    match field {
        EMAIL => MAX_EMAIL_LENGTH,
        PASSWORD => MAX_PASSWORD_LENGTH,
        PHONE_NUMBER => MAX_PHONE_LENGTH,
        COMMENT => MAX_COMMENT_LENGTH,
        _ => 0,
    }
}

/// Message for the error modal: the server's message when it gave one,
/// the fixed connectivity/server text, or the flow's fallback.
fn failure_message(err: &ApiError, fallback: &str) -> String {
    match err {
        ApiError::Validation { message, .. } if message != DEFAULT_VALIDATION_MESSAGE => {
            message.clone()
        }
        ApiError::Network(_) => CONNECTIVITY_MESSAGE.to_string(),
        ApiError::Server { .. } => SERVER_ERROR_MESSAGE.to_string(),
        _ => fallback.to_string(),
    }
}

// ============================================================================
// Login
// ============================================================================

/// Pending login call.
#[derive(Clone)]
pub struct LoginSubmission {
    pub email: String,
    password: String,
}

impl std::fmt::Debug for LoginSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginSubmission")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LoginSubmission {
    pub async fn send(self, api: &ApiClient) -> Result<TokenPair, ApiError> {
        api.login(&self.email, &self.password).await
    }
}

#[derive(Debug, Clone)]
pub struct LoginFlow {
    form: FormState,
    phase: FlowPhase,
    error_modal: Option<String>,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        Self {
            form: FormState::with_fields(&[EMAIL, PASSWORD]),
            phase: FlowPhase::Idle,
            error_modal: None,
        }
    }

    /// Start with the email prefilled, e.g. from the last login.
    pub fn with_email(email: &str) -> Self {
        let mut flow = Self::new();
        flow.form.set(EMAIL, email);
        flow
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Field edits are ignored while a submission is in flight.
    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        (!self.form.submitting).then_some(&mut self.form)
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn error_modal(&self) -> Option<&str> {
        self.error_modal.as_deref()
    }

    /// Check every field, attaching per-field messages. Leaves the flow in
    /// `Validating` on success and back in `Idle` on failure.
    pub fn validate(&mut self) -> bool {
        self.phase = FlowPhase::Validating;
        self.form.errors.clear();

        if !validation::is_valid_email(self.form.value(EMAIL)) {
            self.form.errors.insert(EMAIL, validation::INVALID_EMAIL.to_string());
        }
        if !validation::is_valid_password(self.form.value(PASSWORD)) {
            self.form
                .errors
                .insert(PASSWORD, validation::PASSWORD_TOO_SHORT.to_string());
        }

        if self.form.errors.is_empty() {
            true
        } else {
            debug!(fields = ?self.form.errors.keys().collect::<Vec<_>>(), "Login form invalid");
            self.phase = FlowPhase::Idle;
            false
        }
    }

    /// Validate and move to `Submitting`. Returns nothing when the form is
    /// invalid or a submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<LoginSubmission> {
        if self.phase == FlowPhase::Submitting || !self.validate() {
            return None;
        }
        self.phase = FlowPhase::Submitting;
        self.form.submitting = true;
        self.error_modal = None;
        Some(LoginSubmission {
            email: self.form.value(EMAIL).to_string(),
            password: self.form.value(PASSWORD).to_string(),
        })
    }

    /// Apply the outcome of a submission.
    pub fn finish(
        &mut self,
        result: Result<TokenPair, ApiError>,
        session: &Session,
        notifier: &dyn Notifier,
    ) -> FlowPhase {
        self.form.submitting = false;
        match result {
            Ok(tokens) => {
                session.set_tokens(&tokens.access_token, &tokens.refresh_token);
                self.form.set(PASSWORD, "");
                self.phase = FlowPhase::Success;
                info!("Login successful");
                notifier.success(LOGIN_SUCCESS_MESSAGE);
                session.navigator().navigate(Route::Dashboard);
            }
            Err(e) => {
                self.error_modal = Some(failure_message(&e, LOGIN_FAILED_MESSAGE));
                self.phase = FlowPhase::Failed;
                info!(error = %e, "Login failed");
            }
        }
        self.phase
    }

    /// Validate, send and apply in one go.
    pub async fn submit(&mut self, api: &ApiClient) -> FlowPhase {
        let Some(submission) = self.begin_submit() else {
            return self.phase;
        };
        let result = submission.send(api).await;
        self.finish(result, api.session(), api.notifier().as_ref())
    }

    /// Close the error modal so the user can retry.
    pub fn dismiss_error(&mut self) {
        self.error_modal = None;
        if self.phase == FlowPhase::Failed {
            self.phase = FlowPhase::Idle;
        }
    }

    /// Back to an empty `Idle` form.
    pub fn reset(&mut self) {
        self.form.clear_values();
        self.form.submitting = false;
        self.error_modal = None;
        self.phase = FlowPhase::Idle;
    }
}

// ============================================================================
// Signup request
// ============================================================================

/// Which signup modal is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupModal {
    Closed,
    Form,
    Confirmation,
}

/// Pending signup-request call.
#[derive(Debug, Clone)]
pub struct SignupSubmission {
    pub request: SignupRequest,
}

impl SignupSubmission {
    pub async fn send(self, api: &ApiClient) -> Result<(), ApiError> {
        api.signup_request(&self.request).await
    }
}

#[derive(Debug, Clone)]
pub struct SignupRequestFlow {
    form: FormState,
    phase: FlowPhase,
    modal: SignupModal,
    error_modal: Option<String>,
}

impl Default for SignupRequestFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl SignupRequestFlow {
    pub fn new() -> Self {
        Self {
            form: FormState::with_fields(&[EMAIL, PHONE_NUMBER, COMMENT]),
            phase: FlowPhase::Idle,
            modal: SignupModal::Closed,
            error_modal: None,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Field edits are ignored while a submission is in flight.
    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        (!self.form.submitting).then_some(&mut self.form)
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn modal(&self) -> SignupModal {
        self.modal
    }

    pub fn error_modal(&self) -> Option<&str> {
        self.error_modal.as_deref()
    }

    pub fn open(&mut self) {
        self.modal = SignupModal::Form;
        self.phase = FlowPhase::Idle;
        self.error_modal = None;
    }

    /// Close whichever modal is showing. Ignored while submitting.
    pub fn close(&mut self) {
        if self.form.submitting {
            return;
        }
        self.modal = SignupModal::Closed;
        self.error_modal = None;
        if self.phase != FlowPhase::Success {
            self.phase = FlowPhase::Idle;
        }
    }

    pub fn validate(&mut self) -> bool {
        self.phase = FlowPhase::Validating;
        self.form.errors.clear();

        if !validation::is_valid_email(self.form.value(EMAIL)) {
            self.form.errors.insert(EMAIL, validation::INVALID_EMAIL.to_string());
        }
        if !validation::is_valid_phone(self.form.value(PHONE_NUMBER)) {
            self.form
                .errors
                .insert(PHONE_NUMBER, validation::INVALID_PHONE.to_string());
        }
        if !validation::is_valid_comment(self.form.value(COMMENT)) {
            self.form
                .errors
                .insert(COMMENT, validation::COMMENT_TOO_LONG.to_string());
        }

        if self.form.errors.is_empty() {
            true
        } else {
            debug!(fields = ?self.form.errors.keys().collect::<Vec<_>>(), "Signup form invalid");
            self.phase = FlowPhase::Idle;
            false
        }
    }

    pub fn begin_submit(&mut self) -> Option<SignupSubmission> {
        if self.phase == FlowPhase::Submitting || !self.validate() {
            return None;
        }
        self.phase = FlowPhase::Submitting;
        self.form.submitting = true;
        self.error_modal = None;
        Some(SignupSubmission {
            request: SignupRequest {
                email: self.form.value(EMAIL).to_string(),
                phone_number: non_empty(self.form.value(PHONE_NUMBER)),
                comment: non_empty(self.form.value(COMMENT)),
            },
        })
    }

    /// Apply the outcome. Success swaps the form modal for the confirmation.
    pub fn finish(&mut self, result: Result<(), ApiError>) -> FlowPhase {
        self.form.submitting = false;
        match result {
            Ok(()) => {
                self.form.clear_values();
                self.modal = SignupModal::Confirmation;
                self.phase = FlowPhase::Success;
                info!("Signup request submitted");
            }
            Err(e) => {
                self.error_modal = Some(failure_message(&e, SIGNUP_FAILED_MESSAGE));
                self.phase = FlowPhase::Failed;
                info!(error = %e, "Signup request failed");
            }
        }
        self.phase
    }

    pub async fn submit(&mut self, api: &ApiClient) -> FlowPhase {
        let Some(submission) = self.begin_submit() else {
            return self.phase;
        };
        let result = submission.send(api).await;
        self.finish(result)
    }

    pub fn dismiss_error(&mut self) {
        self.error_modal = None;
        if self.phase == FlowPhase::Failed {
            self.phase = FlowPhase::Idle;
        }
    }

    /// Close the confirmation and get ready for another request.
    pub fn dismiss_confirmation(&mut self) {
        if self.modal == SignupModal::Confirmation {
            self.modal = SignupModal::Closed;
            self.phase = FlowPhase::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{SessionProvider, TokenStore};
    use crate::navigation::RouteState;
    use crate::notify::{NotificationQueue, Severity};

    fn session() -> (Session, RouteState) {
        let nav = RouteState::new(Route::Login);
        let mut provider = SessionProvider::new(TokenStore::in_memory(), Arc::new(nav.clone()));
        (provider.hydrate(), nav)
    }

    fn filled_login(email: &str, password: &str) -> LoginFlow {
        let mut flow = LoginFlow::new();
        let form = flow.form_mut().unwrap();
        form.set(EMAIL, email);
        form.set(PASSWORD, password);
        flow
    }

    #[test]
    fn test_invalid_login_never_submits() {
        let mut flow = filled_login("not-an-email", "123");
        assert!(flow.begin_submit().is_none());
        assert_eq!(flow.phase(), FlowPhase::Idle);
        assert_eq!(flow.form().error(EMAIL), Some(validation::INVALID_EMAIL));
        assert_eq!(flow.form().error(PASSWORD), Some(validation::PASSWORD_TOO_SHORT));
        assert!(!flow.form().is_submitting());
    }

    #[test]
    fn test_valid_login_submits_once() {
        let mut flow = filled_login("trader@cryptopedia.io", "hunter22");
        let submission = flow.begin_submit().unwrap();
        assert_eq!(submission.email, "trader@cryptopedia.io");
        assert_eq!(flow.phase(), FlowPhase::Submitting);
        assert!(flow.form().is_submitting());
        assert!(flow.form_mut().is_none());

        // A second click while in flight does nothing
        assert!(flow.begin_submit().is_none());
        assert_eq!(flow.phase(), FlowPhase::Submitting);
    }

    #[test]
    fn test_login_success_stores_tokens_and_navigates() {
        let (session, nav) = session();
        let notes = NotificationQueue::new();
        let mut flow = filled_login("trader@cryptopedia.io", "hunter22");
        flow.begin_submit().unwrap();

        let tokens = TokenPair {
            access_token: "at".into(),
            refresh_token: "rt".into(),
        };
        assert_eq!(flow.finish(Ok(tokens), &session, &notes), FlowPhase::Success);
        assert!(session.is_authenticated());
        assert_eq!(nav.current(), Route::Dashboard);
        assert_eq!(flow.form().value(PASSWORD), "");
        assert_eq!(notes.snapshot()[0].severity, Severity::Success);
    }

    #[test]
    fn test_login_failure_opens_error_modal_then_retry() {
        let (session, nav) = session();
        let notes = NotificationQueue::new();
        let mut flow = filled_login("trader@cryptopedia.io", "hunter22");
        flow.begin_submit().unwrap();

        let phase = flow.finish(Err(ApiError::Auth { status: 401 }), &session, &notes);
        assert_eq!(phase, FlowPhase::Failed);
        assert_eq!(flow.error_modal(), Some(LOGIN_FAILED_MESSAGE));
        assert!(!session.is_authenticated());
        assert_eq!(nav.total(), 0);

        flow.dismiss_error();
        assert_eq!(flow.phase(), FlowPhase::Idle);
        assert!(flow.begin_submit().is_some());
    }

    #[test]
    fn test_failure_message_prefers_server_text() {
        let err = ApiError::Validation {
            status: 400,
            message: "Account locked".into(),
        };
        assert_eq!(failure_message(&err, LOGIN_FAILED_MESSAGE), "Account locked");

        let err = ApiError::Validation {
            status: 400,
            message: DEFAULT_VALIDATION_MESSAGE.into(),
        };
        assert_eq!(failure_message(&err, LOGIN_FAILED_MESSAGE), LOGIN_FAILED_MESSAGE);
        assert_eq!(
            failure_message(&ApiError::Network("x".into()), LOGIN_FAILED_MESSAGE),
            CONNECTIVITY_MESSAGE
        );
        assert_eq!(
            failure_message(&ApiError::Server { status: 503 }, SIGNUP_FAILED_MESSAGE),
            SERVER_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_reset_returns_to_empty_idle() {
        let mut flow = filled_login("trader@cryptopedia.io", "x");
        flow.begin_submit();
        flow.reset();
        assert_eq!(flow.phase(), FlowPhase::Idle);
        assert_eq!(flow.form().value(EMAIL), "");
        assert!(flow.form().errors().is_empty());
    }

    #[test]
    fn test_push_char_respects_limits() {
        let mut flow = LoginFlow::new();
        let form = flow.form_mut().unwrap();
        assert!(form.push_char(EMAIL, 'a'));
        assert!(!form.push_char(EMAIL, '\n'));
        assert!(!form.push_char("unknown", 'a'));
        form.pop_char(EMAIL);
        assert_eq!(form.value(EMAIL), "");
    }

    #[test]
    fn test_editing_clears_field_error() {
        let mut flow = filled_login("bad", "hunter22");
        flow.begin_submit();
        assert!(flow.form().error(EMAIL).is_some());
        flow.form_mut().unwrap().push_char(EMAIL, 'x');
        assert!(flow.form().error(EMAIL).is_none());
    }

    fn filled_signup(email: &str, phone: &str) -> SignupRequestFlow {
        let mut flow = SignupRequestFlow::new();
        flow.open();
        let form = flow.form_mut().unwrap();
        form.set(EMAIL, email);
        form.set(PHONE_NUMBER, phone);
        flow
    }

    #[test]
    fn test_signup_phone_validation() {
        for phone in ["010-1234-5678", "01012345678", ""] {
            let mut flow = filled_signup("new@cryptopedia.io", phone);
            assert!(flow.validate(), "{phone:?} should pass");
        }

        let mut flow = filled_signup("new@cryptopedia.io", "02-1234-5678");
        assert!(flow.begin_submit().is_none());
        assert_eq!(flow.form().error(PHONE_NUMBER), Some(validation::INVALID_PHONE));
    }

    #[test]
    fn test_signup_request_omits_empty_optionals() {
        let mut flow = filled_signup("new@cryptopedia.io", "");
        let submission = flow.begin_submit().unwrap();
        assert_eq!(submission.request.phone_number, None);
        assert_eq!(submission.request.comment, None);
    }

    #[test]
    fn test_signup_success_shows_confirmation() {
        let mut flow = filled_signup("new@cryptopedia.io", "010-1234-5678");
        flow.begin_submit().unwrap();
        assert_eq!(flow.finish(Ok(())), FlowPhase::Success);
        assert_eq!(flow.modal(), SignupModal::Confirmation);
        assert_eq!(flow.form().value(EMAIL), "");

        flow.dismiss_confirmation();
        assert_eq!(flow.modal(), SignupModal::Closed);
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }

    #[test]
    fn test_signup_failure_keeps_form_open() {
        let mut flow = filled_signup("new@cryptopedia.io", "");
        flow.begin_submit().unwrap();
        flow.close(); // ignored while submitting
        assert_eq!(flow.modal(), SignupModal::Form);

        let err = ApiError::Validation {
            status: 409,
            message: "Request already pending".into(),
        };
        assert_eq!(flow.finish(Err(err)), FlowPhase::Failed);
        assert_eq!(flow.modal(), SignupModal::Form);
        assert_eq!(flow.error_modal(), Some("Request already pending"));
        assert_eq!(flow.form().value(EMAIL), "new@cryptopedia.io");
    }
}
