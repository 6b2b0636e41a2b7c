//! REST API gateway for Cryptopedia services.
//!
//! This module provides the `ApiClient` every screen talks through. It
//! attaches the session's bearer token to outgoing requests and classifies
//! every response into pass-through or one of the `ApiError` categories,
//! running the matching side effect (notification, session invalidation)
//! before handing the error back to the caller.

pub mod classify;
pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
