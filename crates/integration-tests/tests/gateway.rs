//! Gateway auth-protocol tests against the in-process stub backend.
//!
//! Covers the full refresh contract: bearer attachment, one silent
//! refresh-and-retry on 401, 401 propagation without a refresh token,
//! session destruction on refresh failure, and single-flight deduplication
//! of concurrent refreshes.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use madina_client::{ApiConfig, MadinaClient, MemorySessionStore, SessionStore};
use madina_integration_tests::{RefreshMode, StubServer};

fn rotate_to(access: &str, refresh: &str) -> RefreshMode {
    RefreshMode::Rotate {
        access: access.to_owned(),
        refresh: refresh.to_owned(),
        accept: true,
    }
}

fn client_with(server: &StubServer, store: Arc<dyn SessionStore>) -> MadinaClient {
    let config = ApiConfig::new(&server.base_url()).expect("stub base url");
    MadinaClient::new(&config, store).expect("client construction")
}

#[tokio::test]
async fn valid_token_is_attached_as_bearer() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let store = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store);

    client.cart().cart().await.expect("cart fetch");

    assert_eq!(
        server.state.last_cart_auth().await.as_deref(),
        Some("Bearer A1")
    );
    assert_eq!(server.state.refresh_calls(), 0);
}

#[tokio::test]
async fn expired_token_triggers_one_refresh_and_one_retry() {
    // "A1" is stale: the stub only accepts "A2", which refresh hands out.
    let server = StubServer::start("A2", rotate_to("A2", "R2")).await;
    let store = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store);

    client.cart().cart().await.expect("cart fetch after refresh");

    assert_eq!(server.state.refresh_calls(), 1);
    assert_eq!(server.state.cart_get_calls(), 2);
    assert_eq!(
        server.state.last_cart_auth().await.as_deref(),
        Some("Bearer A2")
    );
}

#[tokio::test]
async fn refresh_rotates_both_stored_tokens() {
    // A1 -> 401 -> refresh returns {A2, R2} -> the retried request carries
    // Bearer A2 and the rotated pair is persisted.
    let server = StubServer::start("A2", rotate_to("A2", "R2")).await;
    let store: Arc<MemorySessionStore> = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store.clone());

    let cart = client.cart().cart().await.expect("retried response");
    assert!(cart.items.is_empty());

    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A2"));
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R2"));
}

#[tokio::test]
async fn missing_refresh_token_propagates_the_original_401() {
    let server = StubServer::start("A2", rotate_to("A2", "R2")).await;
    let store = Arc::new(MemorySessionStore::with_access_token("A1"));
    let client = client_with(&server, store);

    let err = client.cart().cart().await.expect_err("401 expected");

    assert!(err.is_unauthorized(), "got: {err}");
    assert_eq!(server.state.refresh_calls(), 0);
    assert_eq!(server.state.cart_get_calls(), 1);
}

#[tokio::test]
async fn failed_refresh_clears_session_and_reports_login_path() {
    let server = StubServer::start("A2", RefreshMode::Reject).await;
    let store: Arc<MemorySessionStore> = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store.clone());

    let err = client.cart().cart().await.expect_err("session expiry");

    assert!(err.is_session_expired(), "got: {err}");
    assert!(err.to_string().contains("/login"));
    assert_eq!(server.state.refresh_calls(), 1);

    // The whole session document is destroyed.
    assert!(store.access_token().await.unwrap().is_none());
    assert!(store.refresh_token().await.unwrap().is_none());
    assert!(store.profile().await.unwrap().is_none());
}

#[tokio::test]
async fn a_retried_request_is_never_retried_again() {
    // Refresh succeeds but hands out a token the stub keeps rejecting, so
    // the retry 401s as well. The gateway must stop there: one refresh,
    // two dispatches, and a plain 401 error.
    let server = StubServer::start(
        "NEVER-VALID",
        RefreshMode::Rotate {
            access: "A2".to_owned(),
            refresh: "R2".to_owned(),
            accept: false,
        },
    )
    .await;
    let store = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store);

    let err = client.cart().cart().await.expect_err("second 401");

    assert!(err.is_unauthorized(), "got: {err}");
    assert_eq!(server.state.refresh_calls(), 1);
    assert_eq!(server.state.cart_get_calls(), 2);
}

#[tokio::test]
async fn non_401_responses_pass_through_without_session_mutation() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let store: Arc<MemorySessionStore> = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store.clone());

    client.cart().cart().await.expect("first pass");
    client.cart().cart().await.expect("second pass");

    assert_eq!(server.state.cart_get_calls(), 2);
    assert_eq!(server.state.refresh_calls(), 0);
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A1"));
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    let server = StubServer::start("A2", rotate_to("A2", "R2")).await;
    let store = Arc::new(MemorySessionStore::with_tokens("A1", "R1"));
    let client = client_with(&server, store);

    let first = client.clone();
    let second = client.clone();
    let (a, b) = tokio::join!(
        async move { first.cart().cart().await },
        async move { second.cart().cart().await },
    );

    a.expect("first concurrent request");
    b.expect("second concurrent request");
    assert_eq!(server.state.refresh_calls(), 1);
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization_header() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let store = Arc::new(MemorySessionStore::new());
    let client = client_with(&server, store);

    // Catalog reads are public; no session means no header at all.
    let page = client
        .catalog()
        .products(&madina_client::types::ListQuery::default())
        .await
        .expect("public listing");
    assert!(!page.data.is_empty());
}
