//! Session context.
//!
//! A [`SessionProvider`] moves through `Uninitialized → Hydrating → Ready`.
//! The [`Session`] handle only exists once hydration has finished; asking
//! the provider for it earlier is an error.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::navigation::{Navigator, Route};

use super::store::{TokenStore, Tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Hydrating,
    Ready,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session accessed before hydration completed (phase: {0:?})")]
    NotReady(SessionPhase),
}

/// Owns the session lifecycle up to the point where a [`Session`] exists.
pub struct SessionProvider {
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
    phase: SessionPhase,
    session: Option<Session>,
}

impl SessionProvider {
    pub fn new(store: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            phase: SessionPhase::Uninitialized,
            session: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Load tokens from the store and become `Ready`.
    ///
    /// Runs once; later calls return the existing session.
    pub fn hydrate(&mut self) -> Session {
        if let Some(ref session) = self.session {
            return session.clone();
        }

        self.phase = SessionPhase::Hydrating;
        let tokens = self.store.load();
        if tokens.is_partial() {
            warn!(
                has_access = tokens.access_token.is_some(),
                has_refresh = tokens.refresh_token.is_some(),
                "Token store holds only one token"
            );
        }
        info!(authenticated = tokens.access_token.is_some(), "Session hydrated");

        let session = Session {
            tokens: Arc::new(RwLock::new(tokens)),
            store: self.store.clone(),
            navigator: self.navigator.clone(),
        };
        self.session = Some(session.clone());
        self.phase = SessionPhase::Ready;
        session
    }

    /// The ready session, or an error outside the `Ready` phase.
    pub fn session(&self) -> Result<Session, SessionError> {
        match (&self.session, self.phase) {
            (Some(session), SessionPhase::Ready) => Ok(session.clone()),
            (_, phase) => Err(SessionError::NotReady(phase)),
        }
    }
}

/// Hydrated session. Clone is cheap and shares state.
///
/// Tokens only change through [`Session::set_tokens`], [`Session::logout`]
/// and [`Session::invalidate`], which always write both together.
#[derive(Clone)]
pub struct Session {
    tokens: Arc<RwLock<Tokens>>,
    store: TokenStore,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    fn read(&self) -> RwLockReadGuard<'_, Tokens> {
        self.tokens.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tokens> {
        self.tokens.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn tokens(&self) -> Tokens {
        self.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().access_token.is_some()
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Persist a new token pair, then make it visible.
    pub fn set_tokens(&self, access: &str, refresh: &str) {
        let mut tokens = self.write();
        self.store.save(access, refresh);
        *tokens = Tokens::new(access, refresh);
        debug!("Session tokens updated");
    }

    /// Clear the session and go to the login screen.
    pub fn logout(&self) {
        {
            let mut tokens = self.write();
            self.store.clear();
            *tokens = Tokens::default();
        }
        info!("Logged out");
        self.navigator.navigate(Route::Login);
    }

    /// Clear the session after the server rejected it.
    ///
    /// Navigates to the login screen unless it is already showing. The check
    /// and the navigation happen under the session write lock, so concurrent
    /// rejections navigate once. Returns whether a navigation happened.
    pub fn invalidate(&self) -> bool {
        let mut tokens = self.write();
        self.store.clear();
        *tokens = Tokens::default();

        if self.navigator.on_auth_screen() {
            debug!("Session invalidated, already on login screen");
            false
        } else {
            info!("Session invalidated, redirecting to login");
            self.navigator.navigate(Route::Login);
            true
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::{MemoryStorage, Storage, REFRESH_TOKEN_KEY};
    use crate::navigation::RouteState;

    fn provider(store: TokenStore) -> (SessionProvider, RouteState) {
        let nav = RouteState::new(Route::Dashboard);
        (SessionProvider::new(store, Arc::new(nav.clone())), nav)
    }

    #[test]
    fn test_session_unavailable_before_hydration() {
        let (provider, _) = provider(TokenStore::in_memory());
        assert_eq!(provider.phase(), SessionPhase::Uninitialized);
        assert_eq!(
            provider.session().unwrap_err(),
            SessionError::NotReady(SessionPhase::Uninitialized)
        );
    }

    #[test]
    fn test_hydrate_reads_store() {
        let store = TokenStore::in_memory();
        store.save("a1", "r1");
        let (mut provider, _) = provider(store);

        let session = provider.hydrate();
        assert_eq!(provider.phase(), SessionPhase::Ready);
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().as_deref(), Some("a1"));
        assert!(provider.session().is_ok());
    }

    #[test]
    fn test_hydrate_twice_shares_state() {
        let (mut provider, _) = provider(TokenStore::in_memory());
        let first = provider.hydrate();
        let second = provider.hydrate();
        first.set_tokens("a", "r");
        assert!(second.is_authenticated());
    }

    #[test]
    fn test_set_tokens_then_logout() {
        let store = TokenStore::in_memory();
        let (mut provider, nav) = provider(store.clone());
        let session = provider.hydrate();

        session.set_tokens("access", "refresh");
        assert!(session.is_authenticated());
        assert_eq!(store.load(), Tokens::new("access", "refresh"));

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.tokens(), Tokens::default());
        assert!(store.load().is_empty());
        assert_eq!(nav.current(), Route::Login);
    }

    #[test]
    fn test_logout_when_logged_out_still_navigates() {
        let (mut provider, nav) = provider(TokenStore::in_memory());
        let session = provider.hydrate();
        session.logout();
        session.logout();
        assert_eq!(nav.count(Route::Login), 2);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_invalidate_redirects_once() {
        let (mut provider, nav) = provider(TokenStore::in_memory());
        let session = provider.hydrate();
        session.set_tokens("a", "r");

        assert!(session.invalidate());
        assert!(!session.invalidate());
        assert_eq!(nav.count(Route::Login), 1);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_partial_store_hydrates_as_loaded() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set_many(&[(REFRESH_TOKEN_KEY, "orphan")]).unwrap();
        let (mut provider, _) = provider(TokenStore::new(storage));

        let session = provider.hydrate();
        assert!(!session.is_authenticated());
        assert_eq!(session.refresh_token().as_deref(), Some("orphan"));
    }
}
