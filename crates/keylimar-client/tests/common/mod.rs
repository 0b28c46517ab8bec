//! In-process mock of the store backend for integration tests.
//!
//! Serves the routes the client talks to, with per-test failure switches
//! and hit counters so tests can assert exactly which requests went out.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use keylimar_client::{
    ApiClient, ClientConfig, MemoryTokenStore, SessionEvents, SessionManager, TokenStore,
};

pub const SIGNING_SECRET: &[u8] = b"test-secret";
pub const KNOWN_CEDULA: &str = "V-12345678";

#[derive(Default)]
pub struct Counters {
    pub login: AtomicUsize,
    pub refresh: AtomicUsize,
    pub ping: AtomicUsize,
    pub payments: AtomicUsize,
    pub approve: AtomicUsize,
    pub deliver: AtomicUsize,
    pub products: AtomicUsize,
}

pub struct BackendState {
    pub counters: Counters,
    pub refresh_fail: AtomicBool,
    pub logout_fail: AtomicBool,
    pub products_unauthorized: AtomicBool,
    pub payment_mode: Mutex<String>,
    sales: Mutex<HashMap<String, Value>>,
    next_sale: AtomicUsize,
}

pub struct TestBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl TestBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::with_base_url(&self.base_url()).expect("backend url");
        config.initial_backoff = std::time::Duration::from_millis(10);
        config
    }
}

pub async fn spawn_backend() -> TestBackend {
    let state = Arc::new(BackendState {
        counters: Counters::default(),
        refresh_fail: AtomicBool::new(false),
        logout_fail: AtomicBool::new(false),
        products_unauthorized: AtomicBool::new(false),
        payment_mode: Mutex::new("centralized".to_string()),
        sales: Mutex::new(HashMap::new()),
        next_sale: AtomicUsize::new(1),
    });

    let app = Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/token/refresh/", post(refresh))
        .route("/auth/logout/", post(logout))
        .route("/auth/ping/", get(ping))
        .route("/products/", get(products))
        .route("/clients/search-by-cedula/", get(search_client))
        .route("/clients/register/", post(register_client))
        .route("/payments/mode/", get(payment_mode))
        .route("/payments/methods/", get(payment_methods))
        .route("/sales/", get(list_sales).post(create_sale))
        .route("/sales/{id}/", get(sale_detail))
        .route("/sales/{id}/payments/", post(register_payment))
        .route("/sales/{id}/approve/", post(approve_sale))
        .route("/sales/{id}/reject/", post(reject_sale))
        .route("/sales/{id}/deliver/", post(deliver_sale))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });

    TestBackend { addr, state }
}

/// Builds the session/api stack against the backend and logs the user in.
pub async fn login_as(
    backend: &TestBackend,
    username: &str,
    events: Arc<dyn SessionEvents>,
) -> (Arc<SessionManager>, Arc<ApiClient>, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let session = Arc::new(
        SessionManager::with_events(backend.config(), store.clone(), events).expect("session"),
    );
    assert!(session.login(username, "secret").await.expect("login"));
    let api = Arc::new(ApiClient::new(backend.config(), session.clone()).expect("api client"));
    (session, api, store)
}

/// Event sink that records every invalidation reason.
#[derive(Default)]
pub struct RecordingEvents {
    pub invalidations: Mutex<Vec<String>>,
}

impl RecordingEvents {
    pub fn reasons(&self) -> Vec<String> {
        self.invalidations.lock().expect("events poisoned").clone()
    }
}

impl SessionEvents for RecordingEvents {
    fn session_invalidated(&self, reason: &str) {
        self.invalidations
            .lock()
            .expect("events poisoned")
            .push(reason.to_string());
    }
}

pub fn mint_token(username: &str, job_position: &str, exp: i64) -> String {
    let claims = json!({
        "user_id": 7,
        "username": username,
        "job_position": job_position,
        "is_superuser": false,
        "exp": exp,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SIGNING_SECRET),
    )
    .expect("mint token")
}

/// Seeds the store with a token pair, as a previous app run would have.
pub fn seed_store(store: &MemoryTokenStore, access: String) {
    store
        .save(&keylimar_client::TokenPair {
            access,
            refresh: "refresh-seed".to_string(),
        })
        .expect("seed store");
}

// =============================================================================
// Handlers
// =============================================================================

fn job_position_for(username: &str) -> &'static str {
    match username {
        "admin" => "administrador",
        "almacen" => "almacenista",
        _ => "cajero",
    }
}

async fn login(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.counters.login.fetch_add(1, Ordering::SeqCst);
    let username = body["username"].as_str().unwrap_or_default().to_string();

    // A user the backend knows but answers for with an empty body, which
    // some deployments do on soft-disabled accounts.
    if username == "broken" {
        return (StatusCode::OK, Json(json!({})));
    }
    if body["password"].as_str() != Some("secret") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Credenciales inválidas"})),
        );
    }

    let access = mint_token(
        &username,
        job_position_for(&username),
        Utc::now().timestamp() + 3600,
    );
    (
        StatusCode::OK,
        Json(json!({"access": access, "refresh": "refresh-token-1"})),
    )
}

async fn refresh(
    State(state): State<Arc<BackendState>>,
    Json(_body): Json<Value>,
) -> impl IntoResponse {
    if state.refresh_fail.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token de refresco inválido"})),
        );
    }
    state.counters.refresh.fetch_add(1, Ordering::SeqCst);
    let access = mint_token("maria", "cajero", Utc::now().timestamp() + 3600);
    (StatusCode::OK, Json(json!({"access": access})))
}

async fn logout(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    if state.logout_fail.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "error interno"})),
        );
    }
    (StatusCode::OK, Json(json!({})))
}

async fn ping(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> impl IntoResponse {
    if !headers.contains_key("authorization") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "no token"})));
    }
    state.counters.ping.fetch_add(1, Ordering::SeqCst);
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn products(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    state.counters.products.fetch_add(1, Ordering::SeqCst);
    if state.products_unauthorized.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Token inválido o expirado"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!([
            {
                "id": "p-1",
                "name": "Harina PAN 1kg",
                "barcode": "7591001000017",
                "description": null,
                "price": "2.50",
                "category_id": "cat-1",
                "stock": 40,
                "is_active": true
            },
            {
                "id": "p-2",
                "name": "Arroz Primor 1kg",
                "barcode": "7591001000024",
                "description": null,
                "price": "1.80",
                "category_id": "cat-1",
                "stock": 25,
                "is_active": true
            }
        ])),
    )
}

async fn search_client(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    if params.get("cedula").map(String::as_str) == Some(KNOWN_CEDULA) {
        (
            StatusCode::OK,
            Json(json!({
                "id": "c-1",
                "cedula": KNOWN_CEDULA,
                "full_name": "Maria Perez",
                "phone": "0414-5551234",
                "address": null,
                "created_at": Utc::now().to_rfc3339()
            })),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Cliente no encontrado"})),
        )
    }
}

async fn register_client(Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "c-2",
            "cedula": body["cedula"],
            "full_name": body["full_name"],
            "phone": body["phone"],
            "address": body["address"],
            "created_at": Utc::now().to_rfc3339()
        })),
    )
}

async fn payment_mode(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    let mode = state.payment_mode.lock().expect("mode poisoned").clone();
    Json(json!({"mode": mode}))
}

async fn payment_methods() -> impl IntoResponse {
    Json(json!([
        {"id": "m-cash", "name": "Efectivo USD", "kind": "cash", "currency_code": "USD"},
        {"id": "m-transfer", "name": "Transferencia", "kind": "transfer", "currency_code": "VES"}
    ]))
}

fn cents_of(amount: &str) -> i64 {
    let value: f64 = amount.parse().expect("money string");
    (value * 100.0).round() as i64
}

fn money_string(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

async fn create_sale(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let lines = body["lines"].as_array().cloned().unwrap_or_default();
    let total_cents: i64 = lines
        .iter()
        .map(|l| {
            l["quantity"].as_i64().unwrap_or(0) * cents_of(l["unit_price"].as_str().unwrap_or("0"))
        })
        .sum();

    let n = state.next_sale.fetch_add(1, Ordering::SeqCst);
    let id = format!("s-{n}");
    let sale = json!({
        "id": id,
        "client_id": body["client_id"],
        "client_name": "Maria Perez",
        "lines": lines,
        "total": money_string(total_cents),
        "status": body["status"],
        "payment_method_id": null,
        "created_at": Utc::now().to_rfc3339(),
        "delivered": false,
        "delivery_status": null,
        "delivered_at": null
    });
    state
        .sales
        .lock()
        .expect("sales poisoned")
        .insert(id, sale.clone());
    (StatusCode::CREATED, Json(sale))
}

async fn list_sales(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let sales = state.sales.lock().expect("sales poisoned");
    let mut matched: Vec<Value> = sales
        .values()
        .filter(|s| match params.get("status") {
            Some(wanted) => s["status"].as_str() == Some(wanted),
            None => true,
        })
        .cloned()
        .collect();
    matched.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));
    Json(matched)
}

async fn sale_detail(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.sales.lock().expect("sales poisoned").get(&id) {
        Some(sale) => (StatusCode::OK, Json(sale.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Venta no encontrada"})),
        ),
    }
}

async fn register_payment(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.counters.payments.fetch_add(1, Ordering::SeqCst);
    let mut sales = state.sales.lock().expect("sales poisoned");
    match sales.get_mut(&id) {
        Some(sale) => {
            sale["payment_method_id"] = body["payment_method_id"].clone();
            (StatusCode::OK, Json(sale.clone()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Venta no encontrada"})),
        ),
    }
}

async fn approve_sale(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.counters.approve.fetch_add(1, Ordering::SeqCst);
    let mut sales = state.sales.lock().expect("sales poisoned");
    match sales.get_mut(&id) {
        Some(sale) if sale["status"] == "pending" => {
            sale["status"] = json!("paid");
            (StatusCode::OK, Json(sale.clone()))
        }
        Some(_) => (
            StatusCode::CONFLICT,
            Json(json!({"detail": "La venta no está pendiente"})),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Venta no encontrada"})),
        ),
    }
}

async fn reject_sale(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut sales = state.sales.lock().expect("sales poisoned");
    match sales.get_mut(&id) {
        Some(sale) if sale["status"] == "pending" => {
            sale["status"] = json!("rejected");
            (StatusCode::OK, Json(sale.clone()))
        }
        Some(_) => (
            StatusCode::CONFLICT,
            Json(json!({"detail": "La venta no está pendiente"})),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Venta no encontrada"})),
        ),
    }
}

async fn deliver_sale(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    state.counters.deliver.fetch_add(1, Ordering::SeqCst);
    let mut sales = state.sales.lock().expect("sales poisoned");
    match sales.get_mut(&id) {
        Some(sale) => {
            sale["delivered"] = json!(true);
            sale["delivery_status"] = json!("delivered");
            sale["delivered_at"] = json!(Utc::now().to_rfc3339());
            (StatusCode::OK, Json(sale.clone()))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Venta no encontrada"})),
        ),
    }
}
