//! Dashboard entry.
//!
//! The dashboard is only reachable with a session. Entering it without one
//! redirects to login; with one, it loads the market snapshot.

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::MarketSnapshot;
use crate::navigation::Route;

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEntry {
    /// No session; the navigator was sent to the login screen.
    Redirected,
    Loaded(MarketSnapshot),
    /// The snapshot failed. The gateway has already notified the user.
    Unavailable(ApiError),
}

/// Check the session, then fetch symbols and tickers.
pub async fn enter(api: &ApiClient) -> DashboardEntry {
    let session = api.session();
    if !session.is_authenticated() {
        debug!("Dashboard entered without a session");
        session.navigator().navigate(Route::Login);
        return DashboardEntry::Redirected;
    }

    match api.market_snapshot().await {
        Ok(snapshot) => {
            debug!(
                symbols = snapshot.symbols.len(),
                tickers = snapshot.tickers.len(),
                "Market snapshot loaded"
            );
            DashboardEntry::Loaded(snapshot)
        }
        Err(e) => {
            warn!(error = %e, "Market snapshot unavailable");
            DashboardEntry::Unavailable(e)
        }
    }
}
