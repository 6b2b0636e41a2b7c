//! Data models for the Cryptopedia API and dashboard.
//!
//! - `auth`: login and signup-request wire types
//! - `market`: market snapshot plus the ticker and RVOL presentation models

pub mod auth;
pub mod market;

pub use auth::{LoginRequest, LoginResponse, SignupRequest, TokenPair};
pub use market::{MarketSnapshot, RvolEntry, RvolTier, TickerQuote};
