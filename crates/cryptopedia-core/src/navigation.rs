//! Route state shared between the core and the front end.
//!
//! The core never inspects screen names; it only asks the navigator to
//! move and whether the auth screen is already showing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Auth flow entry point (login screen)
    Login,
    Dashboard,
}

impl Route {
    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
        }
    }
}

/// Navigation collaborator used by the session and the auth flows.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);

    /// True when the auth flow entry point is the current screen.
    fn on_auth_screen(&self) -> bool;
}

#[derive(Debug)]
struct RouteInner {
    current: Route,
    /// Navigations per destination.
    counts: HashMap<Route, usize>,
}

/// In-process navigator. Clone is cheap and shares state.
#[derive(Debug, Clone)]
pub struct RouteState {
    inner: Arc<Mutex<RouteInner>>,
}

impl RouteState {
    pub fn new(initial: Route) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RouteInner {
                current: initial,
                counts: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RouteInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Route {
        self.lock().current
    }

    /// Number of navigations to `route`.
    pub fn count(&self, route: Route) -> usize {
        self.lock().counts.get(&route).copied().unwrap_or(0)
    }

    /// Number of navigations to any route.
    pub fn total(&self) -> usize {
        self.lock().counts.values().sum()
    }
}

impl Default for RouteState {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

impl Navigator for RouteState {
    fn navigate(&self, route: Route) {
        let mut inner = self.lock();
        debug!(from = ?inner.current, to = ?route, "Navigating");
        inner.current = route;
        *inner.counts.entry(route).or_insert(0) += 1;
    }

    fn on_auth_screen(&self) -> bool {
        self.lock().current == Route::Login
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigate_updates_current_and_counts() {
        let nav = RouteState::new(Route::Dashboard);
        assert!(!nav.on_auth_screen());

        nav.navigate(Route::Login);
        assert_eq!(nav.current(), Route::Login);
        assert!(nav.on_auth_screen());

        nav.navigate(Route::Dashboard);
        nav.navigate(Route::Login);
        assert_eq!(nav.count(Route::Login), 2);
        assert_eq!(nav.count(Route::Dashboard), 1);
        assert_eq!(nav.total(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let nav = RouteState::default();
        let other = nav.clone();
        other.navigate(Route::Login);
        assert_eq!(nav.current(), Route::Login);
    }
}
