//! Authentication module for managing the session and the auth screens.
//!
//! This module provides:
//! - `TokenStore`: persistent storage for the access/refresh token pair
//! - `SessionProvider` / `Session`: hydration and the shared session state
//! - `LoginFlow` / `SignupRequestFlow`: the form state machines
//!
//! There is no refresh-token exchange: a rejected session is cleared and the
//! user logs in again.

pub mod flow;
pub mod session;
pub mod store;

pub use flow::{
    FlowPhase, FormState, LoginFlow, LoginSubmission, SignupModal, SignupRequestFlow,
    SignupSubmission,
};
pub use session::{Session, SessionError, SessionPhase, SessionProvider};
pub use store::{FileStorage, KeyringStorage, MemoryStorage, Storage, TokenStore, Tokens};
