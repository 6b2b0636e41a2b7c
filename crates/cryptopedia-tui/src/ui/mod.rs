//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, login screen, modals and toasts
//! - `dashboard`: Ticker banner, stat cards, RVOL heatmap and alerts
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling

pub mod dashboard;
pub mod input;
pub mod render;
pub mod styles;
