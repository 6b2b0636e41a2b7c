//! API gateway client for the Cryptopedia REST API.
//!
//! Every request goes through two stages:
//!
//! - outbound: the current access token is read from the [`Session`] at
//!   dispatch time and attached as a bearer credential
//! - inbound: the settled outcome is classified (see [`super::classify`]),
//!   the matching side effect runs, and any failure is returned to the caller

use std::sync::Arc;

use anyhow::Context;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Session;
use crate::models::{LoginRequest, LoginResponse, MarketSnapshot, SignupRequest, TokenPair};
use crate::notify::Notifier;

use super::classify::{classify, Outcome, Verdict};
use super::error::{ApiError, CONNECTIVITY_MESSAGE, SERVER_ERROR_MESSAGE};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const SIGNUP_REQUEST_PATH: &str = "/api/v1/auth/signup-request";
pub const MARKET_SYMBOLS_PATH: &str = "/market/symbols";
pub const MARKET_TICKERS_PATH: &str = "/market/tickers";

/// Gateway client shared by the whole process.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client against `base_url`. No request timeout is set; the
    /// transport defaults apply.
    pub fn new(
        base_url: &str,
        session: Session,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            notifier,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Outbound stage: bearer header from the session as of now.
    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.access_token() {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Access token is not a valid header value, sending unauthenticated"),
            }
        }
        headers
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .headers(self.auth_headers())
    }

    /// Send once and run the inbound stage.
    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let detail = e.to_string();
                let err = match classify(&Outcome::NoResponse { detail: &detail }) {
                    Verdict::Reject(err) => err,
                    Verdict::Pass => ApiError::Network(detail),
                };
                return Err(self.react(err, path));
            }
        };

        let status = response.status().as_u16();
        // Status alone decides pass-through; the body is only read on failure.
        if classify(&Outcome::Response { status, body: "" }) == Verdict::Pass {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(path, status, error = %e, "Failed to read error response body");
                String::new()
            }
        };
        match classify(&Outcome::Response { status, body: &body }) {
            Verdict::Reject(err) => {
                debug!(path, status, body = %ApiError::truncate_body(&body), "Request rejected");
                Err(self.react(err, path))
            }
            Verdict::Pass => Err(ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                ApiError::truncate_body(&body)
            ))),
        }
    }

    /// Run the side effect for a classified failure and hand it back.
    fn react(&self, err: ApiError, path: &str) -> ApiError {
        match &err {
            ApiError::Network(detail) => {
                warn!(path, detail = %detail, "No response from server");
                self.notifier.error(CONNECTIVITY_MESSAGE);
            }
            ApiError::Auth { status } => {
                warn!(path, status, "Session rejected by server");
                self.session.invalidate();
            }
            ApiError::Validation { status, message } => {
                warn!(path, status, message = %message, "Request failed validation");
                self.notifier.error(message);
            }
            ApiError::Server { status } => {
                warn!(path, status, "Server error");
                self.notifier.error(SERVER_ERROR_MESSAGE);
            }
            ApiError::InvalidResponse(_) => {}
        }
        err
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(path, error = %e, body = %ApiError::truncate_body(&text), "Failed to decode response");
            ApiError::InvalidResponse(format!("{}: {}", path, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path), path).await?;
        Self::decode(response, path).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        self.send(self.request(Method::POST, path).json(body), path)
            .await
    }

    // ===== Auth =====

    /// Exchange credentials for a token pair. Does not touch the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.post(LOGIN_PATH, &body).await?;
        let parsed: LoginResponse = Self::decode(response, LOGIN_PATH).await?;
        debug!("Login accepted");
        Ok(parsed.data)
    }

    /// Submit a signup request. Any 2xx counts as accepted.
    pub async fn signup_request(&self, request: &SignupRequest) -> Result<(), ApiError> {
        self.post(SIGNUP_REQUEST_PATH, request).await?;
        debug!("Signup request accepted");
        Ok(())
    }

    // ===== Market =====

    pub async fn market_symbols(&self) -> Result<Vec<Value>, ApiError> {
        self.get(MARKET_SYMBOLS_PATH).await
    }

    pub async fn market_tickers(&self) -> Result<Vec<Value>, ApiError> {
        self.get(MARKET_TICKERS_PATH).await
    }

    /// Fetch symbols and tickers together.
    ///
    /// Both calls run to completion so each failure gets classified; the
    /// symbols error wins when both fail.
    pub async fn market_snapshot(&self) -> Result<MarketSnapshot, ApiError> {
        let (symbols, tickers) =
            futures::future::join(self.market_symbols(), self.market_tickers()).await;
        Ok(MarketSnapshot {
            symbols: symbols?,
            tickers: tickers?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SessionProvider, TokenStore};
    use crate::navigation::RouteState;
    use crate::notify::NotificationQueue;

    fn client(base_url: &str) -> ApiClient {
        let mut provider =
            SessionProvider::new(TokenStore::in_memory(), Arc::new(RouteState::default()));
        let session = provider.hydrate();
        ApiClient::new(base_url, session, Arc::new(NotificationQueue::new())).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = client("http://localhost:8080/");
        assert_eq!(api.url(LOGIN_PATH), "http://localhost:8080/api/v1/auth/login");
    }

    #[test]
    fn test_auth_headers_follow_session() {
        let api = client(DEFAULT_BASE_URL);
        assert!(api.auth_headers().get(header::AUTHORIZATION).is_none());

        api.session().set_tokens("abc", "def");
        assert_eq!(
            api.auth_headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );

        api.session().logout();
        assert!(api.auth_headers().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_token_sends_unauthenticated() {
        let api = client(DEFAULT_BASE_URL);
        api.session().set_tokens("bad\ntoken", "r");
        assert!(api.auth_headers().get(header::AUTHORIZATION).is_none());
    }
}
