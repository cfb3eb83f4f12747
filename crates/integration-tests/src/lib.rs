//! In-process stub of the pharmacy backend.
//!
//! Tests spawn one [`StubServer`] per test on an ephemeral port and point a
//! `madina_client::MadinaClient` at it. The stub implements just enough of
//! the REST surface to exercise the client: enveloped responses, bearer-token
//! checking, the unenveloped token-refresh endpoint, and call counters for
//! asserting on the gateway's refresh protocol.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

/// How the stub answers `POST /user/refresh-token`.
#[derive(Debug, Clone)]
pub enum RefreshMode {
    /// Answer with a fresh token pair. When `accept` is true the rotated
    /// access token becomes valid for subsequent requests; when false the
    /// stub keeps rejecting it (exercises the no-second-retry guarantee).
    Rotate {
        access: String,
        refresh: String,
        accept: bool,
    },
    /// Reject the refresh outright.
    Reject,
}

/// Shared, inspectable stub state.
#[derive(Clone)]
pub struct StubState {
    inner: Arc<StubStateInner>,
}

struct StubStateInner {
    valid_access: Mutex<String>,
    refresh_mode: RefreshMode,
    refresh_calls: AtomicUsize,
    cart_get_calls: AtomicUsize,
    product_list_calls: AtomicUsize,
    register_calls: AtomicUsize,
    last_cart_auth: Mutex<Option<String>>,
    products: Mutex<Vec<Value>>,
    cart: Mutex<Vec<Value>>,
    orders: Mutex<Vec<Value>>,
    jobs: Mutex<Vec<Value>>,
}

impl StubState {
    fn new(valid_access: &str, refresh_mode: RefreshMode) -> Self {
        Self {
            inner: Arc::new(StubStateInner {
                valid_access: Mutex::new(valid_access.to_owned()),
                refresh_mode,
                refresh_calls: AtomicUsize::new(0),
                cart_get_calls: AtomicUsize::new(0),
                product_list_calls: AtomicUsize::new(0),
                register_calls: AtomicUsize::new(0),
                last_cart_auth: Mutex::new(None),
                products: Mutex::new(seed_products()),
                cart: Mutex::new(Vec::new()),
                orders: Mutex::new(Vec::new()),
                jobs: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Number of refresh calls received.
    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.inner.refresh_calls.load(Ordering::SeqCst)
    }

    /// Number of `GET /cart/getUserCart` calls received.
    #[must_use]
    pub fn cart_get_calls(&self) -> usize {
        self.inner.cart_get_calls.load(Ordering::SeqCst)
    }

    /// Number of `GET /product/getAllProducts` calls received.
    #[must_use]
    pub fn product_list_calls(&self) -> usize {
        self.inner.product_list_calls.load(Ordering::SeqCst)
    }

    /// Number of `POST /user/register` calls received.
    #[must_use]
    pub fn register_calls(&self) -> usize {
        self.inner.register_calls.load(Ordering::SeqCst)
    }

    /// The `Authorization` header of the most recent cart fetch.
    pub async fn last_cart_auth(&self) -> Option<String> {
        self.inner.last_cart_auth.lock().await.clone()
    }

    async fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.inner.valid_access.lock().await);
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|auth| auth == expected)
    }
}

/// A running stub backend.
pub struct StubServer {
    /// Bound address.
    pub addr: SocketAddr,
    /// Inspectable state shared with the router.
    pub state: StubState,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    /// Spawn a stub accepting `valid_access` as the bearer credential.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound (test environment failure).
    pub async fn start(valid_access: &str, refresh_mode: RefreshMode) -> Self {
        let state = StubState::new(valid_access, refresh_mode);

        let router = Router::new()
            // auth
            .route("/user/register", post(register))
            .route("/user/login", post(login))
            .route("/user/refresh-token", post(refresh_token))
            .route("/user/profile", get(profile))
            // cart
            .route("/cart/getUserCart", get(get_cart))
            .route("/cart/addToCart", post(add_to_cart))
            .route("/cart/updateCartItem/{id}", put(update_cart_item))
            .route("/cart/removeFromCart/{id}", delete(remove_from_cart))
            .route("/cart/clearCart", delete(clear_cart))
            // catalog
            .route("/product/getAllProducts", get(list_products))
            .route("/product/getProduct/{id}", get(get_product))
            .route("/product/createProduct", post(create_product))
            .route("/category/getAllCategories", get(list_categories))
            // orders
            .route("/order/createOrder", post(create_order))
            .route("/order/getUserOrders", get(user_orders))
            .route("/order/getAllOrders", get(user_orders))
            .route("/order/trackOrder/{id}", get(track_order))
            .route("/order/updateOrderStatus/{id}", put(update_order_status))
            // jobs
            .route("/job/getAllJobs", get(list_jobs))
            .route("/job/getAssignedJobs", get(assigned_jobs))
            .route("/job/createJob", post(create_job))
            .route("/job/updateJobStatus/{id}", put(update_job_status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to configure the client with.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Response helpers
// =============================================================================

fn envelope(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "message": "ok", "data": data }))
}

fn envelope_failure(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "message": message, "data": null }))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "jwt expired" })),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": message })),
    )
        .into_response()
}

fn page_of(items: &[Value], params: &HashMap<String, String>) -> Value {
    let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(10);

    let filtered: Vec<&Value> = match params.get("search") {
        Some(term) => {
            let term = term.to_lowercase();
            items
                .iter()
                .filter(|item| {
                    item.get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|name| name.to_lowercase().contains(&term))
                })
                .collect()
        }
        None => items.iter().collect(),
    };

    let total = filtered.len();
    let total_pages = total.div_ceil(limit);
    let data: Vec<Value> = filtered
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .cloned()
        .collect();

    json!({
        "data": data,
        "page": page,
        "limit": limit,
        "total": total,
        "totalPages": total_pages,
    })
}

fn seed_products() -> Vec<Value> {
    let names: [(&str, &str, u32, bool); 8] = [
        ("p1", "Napa 500mg", 120, false),
        ("p2", "Napa Extra", 35, false),
        ("p3", "Seclo 20", 80, true),
        ("p4", "Monas 10", 150, true),
        ("p5", "Fexo 120", 95, false),
        ("p6", "Ace 500", 40, false),
        ("p7", "Histacin", 25, false),
        ("p8", "Entacyd Plus", 60, false),
    ];

    names
        .into_iter()
        .map(|(id, name, price, rx)| {
            json!({
                "id": id,
                "name": name,
                "price": format!("{price}.00"),
                "stock": 50,
                "requiresPrescription": rx,
            })
        })
        .collect()
}

fn stub_user() -> Value {
    json!({
        "id": "u1",
        "name": "Asha Rahman",
        "email": "asha@example.com",
        "role": "customer",
    })
}

// =============================================================================
// Auth handlers
// =============================================================================

async fn register(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.inner.register_calls.fetch_add(1, Ordering::SeqCst);

    let name = body.get("name").and_then(Value::as_str).unwrap_or("new user");
    let email = body
        .get("email")
        .and_then(Value::as_str)
        .unwrap_or("new@example.com");
    let access = state.inner.valid_access.lock().await.clone();

    envelope(json!({
        "accessToken": access,
        "refreshToken": "R1",
        "user": { "id": "u2", "name": name, "email": email, "role": "customer" },
    }))
    .into_response()
}

async fn login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    if password == "wrong" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "invalid credentials" })),
        )
            .into_response();
    }

    let access = state.inner.valid_access.lock().await.clone();
    envelope(json!({
        "accessToken": access,
        "refreshToken": "R1",
        "user": stub_user(),
    }))
    .into_response()
}

async fn refresh_token(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.inner.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if body.get("refreshToken").and_then(Value::as_str).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "refreshToken required" })),
        )
            .into_response();
    }

    match &state.inner.refresh_mode {
        RefreshMode::Rotate {
            access,
            refresh,
            accept,
        } => {
            if *accept {
                *state.inner.valid_access.lock().await = access.clone();
            }
            // The refresh endpoint answers with a bare token pair.
            Json(json!({ "accessToken": access, "refreshToken": refresh })).into_response()
        }
        RefreshMode::Reject => (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "refresh token expired" })),
        )
            .into_response(),
    }
}

async fn profile(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }
    envelope(stub_user()).into_response()
}

// =============================================================================
// Cart handlers
// =============================================================================

async fn cart_value(state: &StubState) -> Value {
    json!({ "items": *state.inner.cart.lock().await })
}

async fn get_cart(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.inner.cart_get_calls.fetch_add(1, Ordering::SeqCst);
    *state.inner.last_cart_auth.lock().await = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    envelope(cart_value(&state).await).into_response()
}

async fn add_to_cart(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let product_id = body.get("productId").and_then(Value::as_str).unwrap_or("");
    let quantity = body.get("quantity").and_then(Value::as_u64).unwrap_or(0);

    let product = {
        let products = state.inner.products.lock().await;
        products
            .iter()
            .find(|p| p.get("id").and_then(Value::as_str) == Some(product_id))
            .cloned()
    };

    let Some(product) = product else {
        return not_found("Product not found");
    };

    let stock = product.get("stock").and_then(Value::as_u64).unwrap_or(0);
    if quantity > stock {
        return envelope_failure("insufficient stock").into_response();
    }

    let mut cart = state.inner.cart.lock().await;
    let line_id = format!("l{}", cart.len() + 1);
    cart.push(json!({ "id": line_id, "product": product, "quantity": quantity }));
    drop(cart);

    envelope(cart_value(&state).await).into_response()
}

async fn update_cart_item(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let quantity = body.get("quantity").and_then(Value::as_u64).unwrap_or(0);
    let mut cart = state.inner.cart.lock().await;
    match cart
        .iter_mut()
        .find(|line| line.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(line) => {
            line["quantity"] = json!(quantity);
        }
        None => return not_found("Cart item not found"),
    }
    drop(cart);

    envelope(cart_value(&state).await).into_response()
}

async fn remove_from_cart(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let mut cart = state.inner.cart.lock().await;
    cart.retain(|line| line.get("id").and_then(Value::as_str) != Some(id.as_str()));
    drop(cart);

    envelope(cart_value(&state).await).into_response()
}

async fn clear_cart(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    state.inner.cart.lock().await.clear();
    // Acknowledgement without a data payload.
    Json(json!({ "success": true, "message": "cart cleared", "data": null })).into_response()
}

// =============================================================================
// Catalog handlers
// =============================================================================

async fn list_products(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state
        .inner
        .product_list_calls
        .fetch_add(1, Ordering::SeqCst);

    let products = state.inner.products.lock().await;
    envelope(page_of(&products, &params)).into_response()
}

async fn get_product(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    let products = state.inner.products.lock().await;
    match products
        .iter()
        .find(|p| p.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(product) => envelope(product.clone()).into_response(),
        None => not_found("Product not found"),
    }
}

async fn create_product(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let mut products = state.inner.products.lock().await;
    let mut product = body;
    product["id"] = json!(format!("p{}", products.len() + 1));
    if product.get("stock").is_none() {
        product["stock"] = json!(0);
    }
    products.push(product.clone());
    drop(products);

    envelope(product).into_response()
}

async fn list_categories(
    State(_state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let categories = vec![
        json!({ "id": "c1", "name": "Pain Relief" }),
        json!({ "id": "c2", "name": "Antibiotics" }),
        json!({ "id": "c3", "name": "Baby Care" }),
    ];
    envelope(page_of(&categories, &params)).into_response()
}

// =============================================================================
// Order handlers
// =============================================================================

async fn create_order(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let mut cart = state.inner.cart.lock().await;
    if cart.is_empty() {
        return envelope_failure("cart is empty").into_response();
    }

    let items: Vec<Value> = cart
        .iter()
        .map(|line| {
            json!({
                "productId": line["product"]["id"],
                "name": line["product"]["name"],
                "price": line["product"]["price"],
                "quantity": line["quantity"],
            })
        })
        .collect();
    cart.clear();
    drop(cart);

    let total: rust_decimal::Decimal = items
        .iter()
        .map(|item| {
            let price: rust_decimal::Decimal = item["price"]
                .as_str()
                .and_then(|p| p.parse().ok())
                .unwrap_or_default();
            let quantity = item["quantity"].as_u64().unwrap_or(0);
            price * rust_decimal::Decimal::from(quantity)
        })
        .sum();

    let mut orders = state.inner.orders.lock().await;
    let order = json!({
        "id": format!("o{}", orders.len() + 1),
        "user": "u1",
        "items": items,
        "total": total.to_string(),
        "status": "pending",
        "paymentStatus": "unpaid",
        "paymentMethod": body.get("paymentMethod").cloned().unwrap_or(json!("cash_on_delivery")),
        "shippingAddress": body.get("shippingAddress").cloned().unwrap_or(json!({
            "line1": "unknown", "city": "unknown"
        })),
        "createdAt": "2026-01-15T10:00:00Z",
        "statusHistory": [
            { "status": "pending", "at": "2026-01-15T10:00:00Z" }
        ],
    });
    orders.push(order.clone());
    drop(orders);

    envelope(order).into_response()
}

async fn user_orders(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let orders = state.inner.orders.lock().await;
    envelope(page_of(&orders, &params)).into_response()
}

async fn track_order(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let orders = state.inner.orders.lock().await;
    match orders
        .iter()
        .find(|o| o.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(order) => envelope(order.clone()).into_response(),
        None => not_found("Order not found"),
    }
}

async fn update_order_status(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let status = body.get("status").cloned().unwrap_or(json!("pending"));
    let mut orders = state.inner.orders.lock().await;
    match orders
        .iter_mut()
        .find(|o| o.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(order) => {
            order["status"] = status.clone();
            if let Some(history) = order["statusHistory"].as_array_mut() {
                history.push(json!({ "status": status, "at": "2026-01-15T12:00:00Z" }));
            }
            envelope(order.clone()).into_response()
        }
        None => not_found("Order not found"),
    }
}

// =============================================================================
// Job handlers
// =============================================================================

async fn list_jobs(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let jobs = state.inner.jobs.lock().await;
    envelope(page_of(&jobs, &params)).into_response()
}

async fn assigned_jobs(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let jobs = state.inner.jobs.lock().await;
    let mine: Vec<Value> = jobs
        .iter()
        .filter(|job| job.get("rider").and_then(Value::as_str) == Some("u1"))
        .cloned()
        .collect();
    envelope(page_of(&mine, &params)).into_response()
}

async fn create_job(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let mut jobs = state.inner.jobs.lock().await;
    let status = if body.get("rider").and_then(Value::as_str).is_some() {
        "assigned"
    } else {
        "open"
    };
    let job = json!({
        "id": format!("j{}", jobs.len() + 1),
        "order": body.get("order").cloned().unwrap_or(json!("o1")),
        "rider": body.get("rider").cloned().unwrap_or(Value::Null),
        "address": body.get("address").cloned().unwrap_or(json!("")),
        "status": status,
        "createdAt": "2026-01-15T11:00:00Z",
    });
    jobs.push(job.clone());
    drop(jobs);

    envelope(job).into_response()
}

async fn update_job_status(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_authorized(&headers).await {
        return unauthorized();
    }

    let status = body.get("status").cloned().unwrap_or(json!("open"));
    let mut jobs = state.inner.jobs.lock().await;
    match jobs
        .iter_mut()
        .find(|j| j.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(job) => {
            job["status"] = status;
            envelope(job.clone()).into_response()
        }
        None => not_found("Job not found"),
    }
}
