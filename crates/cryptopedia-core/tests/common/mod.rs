//! Shared fixtures for the gateway integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use cryptopedia_core::api::ApiClient;
use cryptopedia_core::auth::{SessionProvider, TokenStore};
use cryptopedia_core::navigation::{Route, RouteState};
use cryptopedia_core::notify::{NotificationQueue, Severity};
use serde_json::{json, Value};
use wiremock::{MockServer, ResponseTemplate};

pub struct Harness {
    pub api: ApiClient,
    pub nav: RouteState,
    pub notes: NotificationQueue,
    pub store: TokenStore,
}

impl Harness {
    /// Client against `base_url`, starting on `route` with an empty store.
    pub fn new(base_url: &str, route: Route) -> Self {
        let store = TokenStore::in_memory();
        let nav = RouteState::new(route);
        let notes = NotificationQueue::new();
        let session = SessionProvider::new(store.clone(), Arc::new(nav.clone())).hydrate();
        let api = ApiClient::new(base_url, session, Arc::new(notes.clone())).unwrap();
        Self {
            api,
            nav,
            notes,
            store,
        }
    }

    /// Logged-in client on the dashboard.
    pub fn logged_in(server: &MockServer) -> Self {
        let harness = Self::new(&server.uri(), Route::Dashboard);
        harness.api.session().set_tokens("access-1", "refresh-1");
        harness
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.notes
            .snapshot()
            .into_iter()
            .filter(|n| n.severity == severity)
            .map(|n| n.message)
            .collect()
    }
}

pub fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

pub fn token_response(access: &str, refresh: &str) -> ResponseTemplate {
    json_response(
        200,
        json!({ "data": { "accessToken": access, "refreshToken": refresh } }),
    )
}

/// Address with nothing listening on it.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
