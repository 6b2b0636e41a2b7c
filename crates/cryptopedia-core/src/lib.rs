//! Core library for Cryptopedia.
//!
//! This crate owns everything below the presentation layer:
//!
//! - `auth`: token storage, the session context and the login /
//!   signup-request form flows
//! - `api`: the gateway client with its outbound bearer stage and inbound
//!   response classification
//! - `dashboard`: the dashboard entry check and market snapshot load
//! - `notify`: the toast notification queue
//! - `navigation`: route state shared with the front end
//! - `models`: wire and presentation models
//! - `config`: configuration loading

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod validation;
