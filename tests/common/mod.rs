// ABOUTME: In-process mock SCADA-LTS upstream for integration tests
// ABOUTME: Serves the REST surface on an ephemeral port and counts logins and requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Path prefix the mock serves under, like a stock SCADA-LTS deployment
pub const CONTEXT_PATH: &str = "/Scada-LTS";

/// One authenticated request as observed by the mock
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Behaviour knobs and observations shared with the handlers
#[derive(Default)]
pub struct MockState {
    pub logins: AtomicUsize,
    pub requests: AtomicUsize,
    pub login_delay_ms: AtomicU64,
    pub login_status: AtomicU64,
    pub guest_allowed: AtomicBool,
    pub reject_next: AtomicUsize,
    pub always_reject: AtomicBool,
    pub sources_status: AtomicU64,
    pub points_status: AtomicU64,
    issued: AtomicUsize,
    current_token: Mutex<Option<String>>,
    guest_session: AtomicBool,
    pub login_bodies: Mutex<Vec<Value>>,
    pub seen: Mutex<Vec<Seen>>,
}

impl MockState {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().expect("seen lock").clone()
    }

    pub fn login_bodies(&self) -> Vec<Value> {
        self.login_bodies.lock().expect("login lock").clone()
    }

    pub fn set_login_delay(&self, delay: Duration) {
        self.login_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

/// Running mock upstream
pub struct MockUpstream {
    pub state: Arc<MockState>,
    pub addr: SocketAddr,
}

impl MockUpstream {
    /// Bind to an ephemeral port and start serving
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        state.login_status.store(200, Ordering::SeqCst);
        state.sources_status.store(200, Ordering::SeqCst);
        state.points_status.store(200, Ordering::SeqCst);

        let api = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/datasources", get(data_sources))
            .route("/api/datapoints", get(data_points))
            .route("/api/point-values/{id}/latest", get(point_value))
            .route("/api/point-values/{id}/set", post(set_point_value))
            .route("/api/alarms", get(alarms))
            .route("/api/alarms/{id}/ack", post(acknowledge_alarm))
            .route("/api/system/status", get(system_status));
        let app = Router::new()
            .nest(CONTEXT_PATH, api)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock upstream");
        });

        Self { state, addr }
    }

    /// Base URL including the context path
    pub fn base_url(&self) -> String {
        format!("http://{}{CONTEXT_PATH}", self.addr)
    }
}

/// An address nothing is listening on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}{CONTEXT_PATH}")
}

// ============================================================================
// Handlers
// ============================================================================

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.logins.fetch_add(1, Ordering::SeqCst);
    state.login_bodies.lock().expect("login lock").push(body.clone());

    let delay = state.login_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = state.login_status.load(Ordering::SeqCst) as u16;
    if status != 200 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::UNAUTHORIZED);
        return (code, "Invalid credentials").into_response();
    }

    if body.get("username").is_some() {
        let n = state.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{n}");
        *state.current_token.lock().expect("token lock") = Some(token.clone());
        state.guest_session.store(false, Ordering::SeqCst);
        return Json(json!({ "token": token, "username": body["username"] })).into_response();
    }

    if state.guest_allowed.load(Ordering::SeqCst) {
        *state.current_token.lock().expect("token lock") = None;
        state.guest_session.store(true, Ordering::SeqCst);
        return StatusCode::OK.into_response();
    }
    (StatusCode::UNAUTHORIZED, "Guest access disabled").into_response()
}

/// Record the request and decide whether its session is accepted
fn authorize(
    state: &MockState,
    method: Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Option<Value>,
) -> Option<Response> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    state.seen.lock().expect("seen lock").push(Seen {
        method,
        path: uri.path().to_owned(),
        query: uri.query().map(ToOwned::to_owned),
        authorization: authorization.clone(),
        body,
    });

    let rejected = || Some((StatusCode::UNAUTHORIZED, "Session expired").into_response());

    if state.always_reject.load(Ordering::SeqCst) {
        return rejected();
    }
    if state
        .reject_next
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return rejected();
    }

    let current = state.current_token.lock().expect("token lock").clone();
    match (authorization, current) {
        (Some(header), Some(token)) if header == format!("Bearer {token}") => None,
        (None, None) if state.guest_session.load(Ordering::SeqCst) => None,
        _ => rejected(),
    }
}

async fn data_sources(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, None) {
        return rejection;
    }
    let status = state.sources_status.load(Ordering::SeqCst) as u16;
    if status != 200 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, "Internal failure").into_response();
    }
    Json(json!([
        {"id": 1, "name": "Boiler Room", "type": "MODBUS_IP", "enabled": true},
        {"id": 2, "name": "Chiller", "type": "VIRTUAL", "enabled": false}
    ]))
    .into_response()
}

#[derive(serde::Deserialize)]
struct PointsQuery {
    #[serde(rename = "dataSourceId")]
    data_source_id: Option<i64>,
}

async fn data_points(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<PointsQuery>,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, None) {
        return rejection;
    }
    let status = state.points_status.load(Ordering::SeqCst) as u16;
    if status != 200 {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, "Point store offline").into_response();
    }
    let boiler = [
        json!({"id": 10, "name": "Supply Temp", "dataSourceId": 1}),
        json!({"id": 11, "name": "Return Temp", "dataSourceId": 1}),
        json!({"id": 12, "name": "Pump Running", "dataSourceId": 1}),
    ];
    let chiller = [json!({"id": 20, "name": "Setpoint", "dataSourceId": 2})];
    let points: Vec<Value> = match query.data_source_id {
        Some(1) => boiler.to_vec(),
        Some(2) => chiller.to_vec(),
        Some(_) => Vec::new(),
        None => boiler.iter().chain(chiller.iter()).cloned().collect(),
    };
    Json(Value::Array(points)).into_response()
}

async fn point_value(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, None) {
        return rejection;
    }
    match id.as_str() {
        "11" => (StatusCode::INTERNAL_SERVER_ERROR, "sensor offline").into_response(),
        "13" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => Json(json!({"id": id.parse::<i64>().unwrap_or(0), "value": 21.5, "ts": 1_700_000_000_000_i64}))
            .into_response(),
    }
}

async fn set_point_value(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, Some(body.clone())) {
        return rejection;
    }
    Json(json!({"status": "ok", "value": body["value"]})).into_response()
}

async fn alarms(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, None) {
        return rejection;
    }
    Json(json!([{"id": 7, "message": "High temperature", "active": true}])).into_response()
}

async fn acknowledge_alarm(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, None) {
        return rejection;
    }
    if id == "7" {
        StatusCode::OK.into_response()
    } else {
        (
            StatusCode::CONFLICT,
            format!("{{\"error\":\"Alarm {id} already acknowledged\"}}"),
        )
            .into_response()
    }
}

async fn system_status(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = authorize(&state, method, &uri, &headers, None) {
        return rejection;
    }
    Json(json!({"status": "running", "version": "2.7.8", "uptime": 86_400})).into_response()
}
