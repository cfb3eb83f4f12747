//! Endpoint wrapper tests: envelopes, pagination, caching, and the main
//! shopping flows against the stub backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use madina_client::types::{
    Address, CheckoutRequest, JobInput, ListQuery, PaymentMethod, ProductInput, RegisterInput,
};
use madina_client::{ApiConfig, ApiError, MadinaClient, MemorySessionStore, SessionStore};
use madina_core::{JobStatus, OrderId, OrderStatus, Price, ProductId, UserId};
use madina_integration_tests::{RefreshMode, StubServer};

fn client_with(server: &StubServer, store: Arc<dyn SessionStore>) -> MadinaClient {
    let config = ApiConfig::new(&server.base_url()).expect("stub base url");
    MadinaClient::new(&config, store).expect("client construction")
}

async fn logged_in_client(server: &StubServer) -> MadinaClient {
    let client = client_with(server, Arc::new(MemorySessionStore::new()));
    client
        .auth()
        .login("asha@example.com", "correct-horse")
        .await
        .expect("login");
    client
}

#[tokio::test]
async fn login_persists_tokens_and_profile() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let store: Arc<MemorySessionStore> = Arc::new(MemorySessionStore::new());
    let client = client_with(&server, store.clone());

    let profile = client
        .auth()
        .login("asha@example.com", "correct-horse")
        .await
        .expect("login");

    assert_eq!(profile.name, "Asha Rahman");
    assert_eq!(store.access_token().await.unwrap().as_deref(), Some("A1"));
    assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("R1"));
    assert!(client.auth().current_user().await.unwrap().is_some());

    client.auth().logout().await.expect("logout");
    assert!(store.access_token().await.unwrap().is_none());
    assert!(client.auth().current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn rejected_login_is_an_opaque_status_error() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = client_with(&server, Arc::new(MemorySessionStore::new()));

    let err = client
        .auth()
        .login("asha@example.com", "wrong")
        .await
        .expect_err("bad credentials");

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid credentials");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn register_validation_fails_before_any_request() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = client_with(&server, Arc::new(MemorySessionStore::new()));

    let err = client
        .auth()
        .register(&RegisterInput {
            name: "Asha".to_owned(),
            email: "asha@example.com".to_owned(),
            phone: None,
            password: "correct-horse".to_owned(),
            confirm_password: "different".to_owned(),
        })
        .await
        .expect_err("mismatched passwords");

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(server.state.register_calls(), 0);
}

#[tokio::test]
async fn product_listing_paginates_and_searches() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = client_with(&server, Arc::new(MemorySessionStore::new()));

    let page = client
        .catalog()
        .products(&ListQuery::page(2, 3))
        .await
        .expect("page 2");
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 3);
    assert_eq!(page.total, 8);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.data.len(), 3);

    let hits = client
        .catalog()
        .products(&ListQuery::search("napa"))
        .await
        .expect("search");
    assert_eq!(hits.total, 2);
    assert!(hits.data.iter().all(|p| p.name.to_lowercase().contains("napa")));
}

#[tokio::test]
async fn unknown_product_is_an_opaque_404() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = client_with(&server, Arc::new(MemorySessionStore::new()));

    let err = client
        .catalog()
        .product(&ProductId::new("missing"))
        .await
        .expect_err("not found");

    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Product not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn catalog_reads_are_cached_and_mutations_invalidate() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let query = ListQuery::page(1, 10);
    let first = client.catalog().products(&query).await.expect("list");
    let second = client.catalog().products(&query).await.expect("cached list");
    assert_eq!(first.total, second.total);
    assert_eq!(server.state.product_list_calls(), 1);

    client
        .catalog()
        .create_product(&ProductInput {
            name: "Napa Syrup".to_owned(),
            description: None,
            price: Price::from_major(55),
            stock: 20,
            category: None,
            image: None,
            requires_prescription: false,
        })
        .await
        .expect("create product");

    let third = client.catalog().products(&query).await.expect("fresh list");
    assert_eq!(server.state.product_list_calls(), 2);
    assert_eq!(third.total, first.total + 1);
    assert!(third.data.iter().any(|p| p.name == "Napa Syrup"));
}

#[tokio::test]
async fn cart_flow_add_update_remove_clear() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let cart = client
        .cart()
        .add(ProductId::new("p1"), 2)
        .await
        .expect("add");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.unit_count(), 2);
    assert_eq!(cart.subtotal(), Price::from_major(240));

    let line = cart.items[0].id.clone();
    let cart = client.cart().update_item(&line, 3).await.expect("update");
    assert_eq!(cart.unit_count(), 3);

    let cart = client.cart().remove_item(&line).await.expect("remove");
    assert!(cart.items.is_empty());

    client
        .cart()
        .add(ProductId::new("p2"), 1)
        .await
        .expect("re-add");
    client.cart().clear().await.expect("clear");
    let cart = client.cart().cart().await.expect("fetch");
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn envelope_failure_surfaces_the_server_message() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    // More units than the stub has in stock: 2xx response, success: false.
    let err = client
        .cart()
        .add(ProductId::new("p1"), 999)
        .await
        .expect_err("stock limit");

    match err {
        ApiError::Api { message } => assert_eq!(message, "insufficient stock"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn zero_quantity_is_rejected_client_side() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let err = client
        .cart()
        .add(ProductId::new("p1"), 0)
        .await
        .expect_err("zero quantity");
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn checkout_builds_an_order_and_empties_the_cart() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    client
        .cart()
        .add(ProductId::new("p1"), 2)
        .await
        .expect("add");
    client
        .cart()
        .add(ProductId::new("p6"), 1)
        .await
        .expect("add");

    let order = client
        .orders()
        .checkout(&CheckoutRequest {
            shipping_address: Address {
                line1: "12 Green Road".to_owned(),
                line2: None,
                city: "Dhaka".to_owned(),
                postcode: Some("1205".to_owned()),
                phone: None,
            },
            payment_method: PaymentMethod::CashOnDelivery,
        })
        .await
        .expect("checkout");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.total, Price::from_major(280));

    let cart = client.cart().cart().await.expect("cart after checkout");
    assert!(cart.items.is_empty());

    let mine = client
        .orders()
        .mine(&ListQuery::default())
        .await
        .expect("order listing");
    assert_eq!(mine.total, 1);
}

#[tokio::test]
async fn checkout_with_empty_cart_fails() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let err = client
        .orders()
        .checkout(&CheckoutRequest {
            shipping_address: Address {
                line1: "12 Green Road".to_owned(),
                line2: None,
                city: "Dhaka".to_owned(),
                postcode: None,
                phone: None,
            },
            payment_method: PaymentMethod::CashOnDelivery,
        })
        .await
        .expect_err("empty cart");

    assert!(matches!(err, ApiError::Api { .. }));
}

#[tokio::test]
async fn order_tracking_shows_status_history() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    client
        .cart()
        .add(ProductId::new("p1"), 1)
        .await
        .expect("add");
    let order = client
        .orders()
        .checkout(&CheckoutRequest {
            shipping_address: Address {
                line1: "12 Green Road".to_owned(),
                line2: None,
                city: "Dhaka".to_owned(),
                postcode: None,
                phone: None,
            },
            payment_method: PaymentMethod::Card,
        })
        .await
        .expect("checkout");

    let updated = client
        .orders()
        .update_status(&order.id, OrderStatus::Confirmed, Some("packed".to_owned()))
        .await
        .expect("status update");
    assert_eq!(updated.status, OrderStatus::Confirmed);

    let tracked = client.orders().track(&order.id).await.expect("track");
    assert_eq!(tracked.status, OrderStatus::Confirmed);
    assert_eq!(tracked.status_history.len(), 2);
    assert_eq!(tracked.status_history[0].status, OrderStatus::Pending);
}

#[tokio::test]
async fn tracking_an_unknown_order_is_a_404() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let err = client
        .orders()
        .track(&OrderId::new("missing"))
        .await
        .expect_err("unknown order");
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}

#[tokio::test]
async fn job_lifecycle_create_assign_complete() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let job = client
        .jobs()
        .create(&JobInput {
            order: OrderId::new("o1"),
            rider: Some(UserId::new("u1")),
            address: "12 Green Road, Dhaka".to_owned(),
        })
        .await
        .expect("create job");
    assert_eq!(job.status, JobStatus::Assigned);

    let mine = client
        .jobs()
        .assigned(&ListQuery::default())
        .await
        .expect("assigned jobs");
    assert_eq!(mine.total, 1);

    let done = client
        .jobs()
        .update_status(&job.id, JobStatus::Completed)
        .await
        .expect("complete");
    assert_eq!(done.status, JobStatus::Completed);

    let all = client
        .jobs()
        .list(&ListQuery::default())
        .await
        .expect("all jobs");
    assert_eq!(all.data[0].status, JobStatus::Completed);
}

#[tokio::test]
async fn unassigned_job_starts_open() {
    let server = StubServer::start("A1", RefreshMode::Reject).await;
    let client = logged_in_client(&server).await;

    let job = client
        .jobs()
        .create(&JobInput {
            order: OrderId::new("o1"),
            rider: None,
            address: "45 Mirpur Road".to_owned(),
        })
        .await
        .expect("create job");
    assert_eq!(job.status, JobStatus::Open);

    let mine = client
        .jobs()
        .assigned(&ListQuery::default())
        .await
        .expect("assigned jobs");
    assert_eq!(mine.total, 0);
}
