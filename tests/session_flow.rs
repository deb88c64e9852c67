// ABOUTME: Integration tests for login, re-authentication, and tool dispatch against a mock upstream
// ABOUTME: Verifies single-flight login, one-retry expiry handling, config replacement, and error mapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 dravr.ai

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::http::Method;
use futures::future::join_all;
use scada_lts::{AuthState, ClientConfig, ConnectionConfig, ErrorKind, ScadaClient};
use serde_json::{json, Value};

use common::MockUpstream;

fn admin(base_url: &str) -> ConnectionConfig {
    ConnectionConfig::new(base_url)
        .expect("valid url")
        .with_credentials(Some("admin".to_owned()), Some("admin".to_owned()))
}

async fn connected(mock: &MockUpstream) -> ScadaClient {
    ScadaClient::with_connection(&ClientConfig::default(), admin(&mock.base_url()))
        .await
        .expect("client")
}

// ============================================================================
// Login Lifecycle
// ============================================================================

#[tokio::test]
async fn concurrent_first_calls_share_one_login() {
    let mock = MockUpstream::start().await;
    mock.state.set_login_delay(Duration::from_millis(150));
    let client = connected(&mock).await;

    let calls = (0..10).map(|_| client.dispatch("get_data_sources", &Value::Null));
    let results = join_all(calls).await;

    assert!(results.iter().all(|r| r.success), "{results:?}");
    assert_eq!(mock.state.logins(), 1);
    assert_eq!(mock.state.requests(), 10);
    assert_eq!(client.session().state().await, AuthState::Authenticated);
}

#[tokio::test]
async fn rejected_token_triggers_one_reauth_and_retry() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    assert!(client.dispatch("get_system_status", &json!({})).await.success);
    assert_eq!(mock.state.logins(), 1);

    mock.state.reject_next.store(1, Ordering::SeqCst);
    let result = client.dispatch("get_system_status", &json!({})).await;

    assert!(result.success, "{result:?}");
    assert_eq!(mock.state.logins(), 2);
    assert_eq!(mock.state.requests(), 3);

    let seen = mock.state.seen();
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer token-1"));
    assert_eq!(seen[2].authorization.as_deref(), Some("Bearer token-2"));
}

#[tokio::test]
async fn second_rejection_surfaces_auth_error_without_more_retries() {
    let mock = MockUpstream::start().await;
    mock.state.always_reject.store(true, Ordering::SeqCst);
    let client = connected(&mock).await;

    let result = client.dispatch("get_alarms", &json!({})).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Auth));
    let error = result.error.expect("error");
    assert_eq!(error.status, Some(401));
    assert_eq!(error.message, "Session expired");
    assert_eq!(mock.state.logins(), 2);
    assert_eq!(mock.state.requests(), 2);
}

#[tokio::test]
async fn replacing_config_discards_old_token() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;
    assert!(client.dispatch("get_data_sources", &json!({})).await.success);
    let before = mock.state.seen().len();

    let configured = client
        .dispatch(
            "configure_connection",
            &json!({"base_url": mock.base_url(), "username": "operator", "password": "secret"}),
        )
        .await;
    assert!(configured.success);
    assert_eq!(
        configured.payload.expect("payload")["authentication"],
        "successful"
    );
    assert_eq!(mock.state.logins(), 2);

    assert!(client.dispatch("get_data_sources", &json!({})).await.success);
    let after = &mock.state.seen()[before..];
    assert!(!after.is_empty());
    assert!(after
        .iter()
        .all(|s| s.authorization.as_deref() == Some("Bearer token-2")));
    assert_eq!(client.session().snapshot().await.generation, 2);
}

#[tokio::test]
async fn config_replaced_during_login_discards_stale_outcome() {
    let old = MockUpstream::start().await;
    let new = MockUpstream::start().await;
    old.state.set_login_delay(Duration::from_millis(300));
    let client = connected(&old).await;

    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.dispatch("get_data_sources", &json!({})).await })
    };
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(client.session().state().await, AuthState::Authenticating);
    let generation = client.session().configure(admin(&new.base_url())).await;

    let result = pending.await.expect("join");

    assert!(result.success, "{result:?}");
    assert_eq!(old.state.logins(), 1);
    assert_eq!(old.state.requests(), 0);
    assert_eq!(new.state.logins(), 1);
    assert_eq!(new.state.requests(), 1);

    let snapshot = client.session().snapshot().await;
    assert_eq!(snapshot.state, AuthState::Authenticated);
    assert_eq!(snapshot.generation, generation);
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.base_url.as_deref(), Some(new.base_url().as_str()));
}

#[tokio::test]
async fn guest_login_without_credentials() {
    let mock = MockUpstream::start().await;
    mock.state.guest_allowed.store(true, Ordering::SeqCst);
    let client = ScadaClient::new(&ClientConfig::default()).expect("client");

    let configured = client
        .dispatch("configure_connection", &json!({"base_url": mock.base_url()}))
        .await;
    assert_eq!(
        configured.payload.expect("payload")["authentication"],
        "guest"
    );
    assert_eq!(mock.state.logins(), 0);

    let result = client.dispatch("get_system_status", &json!({})).await;

    assert!(result.success, "{result:?}");
    assert_eq!(mock.state.login_bodies(), vec![json!({})]);
    assert_eq!(mock.state.seen()[0].authorization, None);
    let snapshot = client.session().snapshot().await;
    assert_eq!(snapshot.state, AuthState::Authenticated);
    assert!(!snapshot.has_token);
}

#[tokio::test]
async fn refused_guest_login_is_auth_error() {
    let mock = MockUpstream::start().await;
    let client = ScadaClient::with_connection(
        &ClientConfig::default(),
        ConnectionConfig::new(&mock.base_url()).expect("valid"),
    )
    .await
    .expect("client");

    let result = client.dispatch("get_data_points", &json!({})).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Auth));
    assert_eq!(result.error.expect("error").status, Some(401));
    assert_eq!(mock.state.requests(), 0);
    assert_eq!(client.session().state().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn failed_eager_login_is_reported_but_config_applies() {
    let mock = MockUpstream::start().await;
    mock.state.login_status.store(401, Ordering::SeqCst);
    let client = ScadaClient::new(&ClientConfig::default()).expect("client");

    let result = client
        .dispatch(
            "configure_connection",
            &json!({"base_url": mock.base_url(), "username": "admin", "password": "wrong"}),
        )
        .await;

    assert!(result.success);
    let payload = result.payload.expect("payload");
    assert_eq!(payload["authentication"], "failed");
    assert!(payload["error"]
        .as_str()
        .expect("error text")
        .contains("Invalid credentials"));
    assert!(client.session().is_configured().await);
}

#[tokio::test]
async fn cancelled_login_does_not_wedge_session() {
    let mock = MockUpstream::start().await;
    mock.state.set_login_delay(Duration::from_millis(400));
    let client = connected(&mock).await;

    let first = {
        let client = client.clone();
        tokio::spawn(async move { client.dispatch("get_data_sources", &json!({})).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    first.abort();
    assert!(first.await.is_err());

    mock.state.set_login_delay(Duration::ZERO);
    let result = client.dispatch("get_data_sources", &json!({})).await;

    assert!(result.success, "{result:?}");
    assert_eq!(client.session().state().await, AuthState::Authenticated);
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn data_sources_success_and_upstream_failure() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    let ok = client.dispatch("get_data_sources", &json!({})).await;
    let payload = ok.payload.expect("payload");
    assert_eq!(payload.as_array().expect("array").len(), 2);

    mock.state.sources_status.store(500, Ordering::SeqCst);
    let failed = client.dispatch("get_data_sources", &json!({})).await;
    assert_eq!(failed.error_kind(), Some(ErrorKind::Upstream));
    let error = failed.error.expect("error");
    assert_eq!(error.status, Some(500));
    assert_eq!(error.message, "Internal failure");
    assert_eq!(mock.state.logins(), 1);
}

#[tokio::test]
async fn acknowledge_alarm_posts_to_ack_path() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    let ok = client
        .dispatch("acknowledge_alarm", &json!({"alarm_id": 7}))
        .await;
    assert!(ok.success);
    assert_eq!(ok.payload, Some(Value::Null));
    let seen = mock.state.seen();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].path, "/api/alarms/7/ack");

    let conflict = client
        .dispatch("acknowledge_alarm", &json!({"alarm_id": "99"}))
        .await;
    let error = conflict.error.expect("error");
    assert_eq!(error.kind, ErrorKind::Upstream);
    assert_eq!(error.status, Some(409));
    assert_eq!(error.message, r#"{"error":"Alarm 99 already acknowledged"}"#);
}

#[tokio::test]
async fn malformed_success_body_is_parse_error() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    let result = client
        .dispatch("get_point_value", &json!({"point_id": 13}))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Parse));
}

#[tokio::test]
async fn unreachable_upstream_is_connectivity_error() {
    let client = ScadaClient::with_connection(
        &ClientConfig::default().with_timeout(Duration::from_secs(2)),
        admin(&common::closed_port_url().await),
    )
    .await
    .expect("client");

    let result = client
        .dispatch("get_point_value", &json!({"point_id": 123}))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Connectivity));
    assert_eq!(client.session().state().await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn point_value_before_configure_is_auth_error() {
    let client = ScadaClient::new(&ClientConfig::default()).expect("client");
    let result = client
        .dispatch("get_point_value", &json!({"point_id": 123}))
        .await;
    assert_eq!(result.error_kind(), Some(ErrorKind::Auth));
}

// ============================================================================
// Validation and Routing
// ============================================================================

#[tokio::test]
async fn validation_failures_never_reach_network() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    let numeric = client
        .dispatch(
            "set_point_value",
            &json!({"point_id": 5, "value": "warm", "data_type": "numeric"}),
        )
        .await;
    assert_eq!(numeric.error_kind(), Some(ErrorKind::Validation));

    let binary = client
        .dispatch(
            "set_point_value",
            &json!({"point_id": 5, "value": "maybe", "data_type": "binary"}),
        )
        .await;
    assert_eq!(binary.error_kind(), Some(ErrorKind::Validation));

    let missing = client.dispatch("get_point_value", &json!({})).await;
    assert_eq!(missing.error_kind(), Some(ErrorKind::Validation));

    let unknown = client.dispatch("reboot_plc", &json!({})).await;
    assert_eq!(unknown.error_kind(), Some(ErrorKind::NotFoundOperation));

    assert_eq!(mock.state.logins(), 0);
    assert_eq!(mock.state.requests(), 0);
}

#[tokio::test]
async fn set_point_value_sends_typed_body() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    let result = client
        .dispatch(
            "set_point_value",
            &json!({"point_id": "12", "value": "1", "data_type": "binary"}),
        )
        .await;

    assert!(result.success, "{result:?}");
    let seen = mock.state.seen();
    assert_eq!(seen[0].path, "/api/point-values/12/set");
    assert_eq!(seen[0].body, Some(json!({"value": true})));
}

#[tokio::test]
async fn filters_become_query_parameters() {
    let mock = MockUpstream::start().await;
    let client = connected(&mock).await;

    let points = client
        .dispatch("get_data_points", &json!({"data_source_id": 2}))
        .await;
    assert_eq!(points.payload.expect("payload").as_array().map(Vec::len), Some(1));

    client.dispatch("get_alarms", &json!({})).await;
    client
        .dispatch("get_alarms", &json!({"active_only": false}))
        .await;

    let queries: Vec<_> = mock.state.seen().into_iter().map(|s| s.query).collect();
    assert_eq!(
        queries,
        vec![
            Some("dataSourceId=2".to_owned()),
            Some("active=true".to_owned()),
            None
        ]
    );
}

#[tokio::test]
async fn independent_clients_do_not_share_sessions() {
    let mock = MockUpstream::start().await;
    let first = connected(&mock).await;
    let second = connected(&mock).await;

    assert!(first.dispatch("get_system_status", &json!({})).await.success);
    assert_eq!(second.session().state().await, AuthState::Unauthenticated);
}
