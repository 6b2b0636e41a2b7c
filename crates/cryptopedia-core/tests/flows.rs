//! End-to-end tests for the auth flows and the dashboard entry.

mod common;

use common::{json_response, token_response, Harness};
use cryptopedia_core::auth::flow::{
    EMAIL, LOGIN_FAILED_MESSAGE, LOGIN_SUCCESS_MESSAGE, PASSWORD, PHONE_NUMBER,
};
use cryptopedia_core::auth::{FlowPhase, LoginFlow, SignupModal, SignupRequestFlow, Tokens};
use cryptopedia_core::dashboard::{self, DashboardEntry};
use cryptopedia_core::navigation::Route;
use cryptopedia_core::notify::Severity;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_flow(email: &str, password: &str) -> LoginFlow {
    let mut flow = LoginFlow::new();
    let form = flow.form_mut().unwrap();
    form.set(EMAIL, email);
    form.set(PASSWORD, password);
    flow
}

#[tokio::test]
async fn test_login_then_authenticated_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({ "email": "trader@cryptopedia.io", "password": "hunter22" })))
        .respond_with(token_response("at-1", "rt-1"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/market/symbols"))
        .and(header("authorization", "Bearer at-1"))
        .respond_with(json_response(200, json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let h = Harness::new(&server.uri(), Route::Login);
    let mut flow = login_flow("trader@cryptopedia.io", "hunter22");

    assert_eq!(flow.submit(&h.api).await, FlowPhase::Success);
    assert_eq!(h.nav.current(), Route::Dashboard);
    assert_eq!(h.store.load(), Tokens::new("at-1", "rt-1"));
    assert_eq!(h.messages(Severity::Success), vec![LOGIN_SUCCESS_MESSAGE]);

    h.api.market_symbols().await.unwrap();
}

#[tokio::test]
async fn test_invalid_login_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(token_response("x", "y"))
        .expect(0)
        .mount(&server)
        .await;

    let h = Harness::new(&server.uri(), Route::Login);
    let mut flow = login_flow("trader@cryptopedia", "12345");

    assert_eq!(flow.submit(&h.api).await, FlowPhase::Idle);
    assert_eq!(flow.form().errors().len(), 2);
    assert!(!h.api.session().is_authenticated());
}

#[tokio::test]
async fn test_wrong_credentials_show_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = Harness::new(&server.uri(), Route::Login);
    let mut flow = login_flow("trader@cryptopedia.io", "wrongpass");

    assert_eq!(flow.submit(&h.api).await, FlowPhase::Failed);
    assert_eq!(flow.error_modal(), Some(LOGIN_FAILED_MESSAGE));
    // Already on the login screen, so no redirect
    assert_eq!(h.nav.total(), 0);
    assert!(!h.api.session().is_authenticated());
}

#[tokio::test]
async fn test_login_error_message_from_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(json_response(
            400,
            json!({ "error": { "message": "Account pending approval" } }),
        ))
        .mount(&server)
        .await;

    let h = Harness::new(&server.uri(), Route::Login);
    let mut flow = login_flow("trader@cryptopedia.io", "hunter22");

    assert_eq!(flow.submit(&h.api).await, FlowPhase::Failed);
    assert_eq!(flow.error_modal(), Some("Account pending approval"));
    assert_eq!(h.messages(Severity::Error), vec!["Account pending approval"]);
}

#[tokio::test]
async fn test_signup_request_sends_only_filled_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/signup-request"))
        .and(body_json(json!({ "email": "new@cryptopedia.io", "phoneNumber": "010-1234-5678" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let h = Harness::new(&server.uri(), Route::Login);
    let mut flow = SignupRequestFlow::new();
    flow.open();
    let form = flow.form_mut().unwrap();
    form.set(EMAIL, "new@cryptopedia.io");
    form.set(PHONE_NUMBER, "010-1234-5678");

    assert_eq!(flow.submit(&h.api).await, FlowPhase::Success);
    assert_eq!(flow.modal(), SignupModal::Confirmation);
    assert!(!h.api.session().is_authenticated());
}

#[tokio::test]
async fn test_signup_request_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let h = Harness::new(&server.uri(), Route::Login);
    let mut flow = SignupRequestFlow::new();
    flow.open();
    flow.form_mut().unwrap().set(EMAIL, "new@cryptopedia.io");

    assert_eq!(flow.submit(&h.api).await, FlowPhase::Failed);
    assert_eq!(flow.modal(), SignupModal::Form);
    assert!(flow.error_modal().is_some());
}

#[tokio::test]
async fn test_dashboard_enter_loads_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/market/symbols"))
        .respond_with(json_response(200, json!([{ "symbol": "SOL" }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/market/tickers"))
        .respond_with(json_response(200, json!([{ "symbol": "SOL", "price": "142.8" }])))
        .mount(&server)
        .await;

    let h = Harness::logged_in(&server);
    match dashboard::enter(&h.api).await {
        DashboardEntry::Loaded(snapshot) => {
            assert_eq!(snapshot.quotes()[0].symbol, "SOL");
        }
        other => panic!("expected snapshot, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dashboard_enter_with_rejected_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = Harness::logged_in(&server);
    let entry = dashboard::enter(&h.api).await;

    assert!(matches!(entry, DashboardEntry::Unavailable(_)));
    assert_eq!(h.nav.count(Route::Login), 1);
    assert!(!h.api.session().is_authenticated());
}
