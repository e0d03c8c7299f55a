//! Splitwise client against a local stand-in of the bookkeeping API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use split_board::config::UpstreamConfig;
use split_board::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const API_KEY: &str = "test-key-123";

#[derive(Clone, Default)]
struct MockApi {
    /// Query strings seen by /get_expenses
    seen: Arc<Mutex<Vec<HashMap<String, String>>>>,
    /// When set, every endpoint answers with this body as-is
    raw_body: Option<&'static str>,
    /// When set, /get_expenses sleeps this long before answering
    delay: Option<Duration>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

async fn get_expenses(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid API request"})))
            .into_response();
    }
    if let Some(delay) = api.delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(body) = api.raw_body {
        return body.into_response();
    }

    let group_id: i64 = query
        .get("group_id")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    api.seen.lock().unwrap().push(query);

    Json(json!({
        "expenses": [
            {
                "id": 902,
                "group_id": group_id,
                "description": "Groceries",
                "cost": "42.10",
                "currency_code": "CAD",
                "date": "2026-10-01T18:00:00Z",
                "created_at": "2026-10-01T18:05:11Z",
                "payment": false,
                "users": [
                    {
                        "user": { "id": 1, "first_name": "Ana", "last_name": "Ruiz" },
                        "user_id": 1,
                        "paid_share": "42.10",
                        "owed_share": "21.05",
                        "net_balance": "21.05"
                    },
                    {
                        "user": { "id": 2, "first_name": "Ben", "last_name": null },
                        "user_id": 2,
                        "paid_share": "0.00",
                        "owed_share": "21.05",
                        "net_balance": "-21.05"
                    }
                ]
            },
            {
                "id": 901,
                "group_id": group_id,
                "description": "Rent",
                "cost": "1500.00",
                "currency_code": "CAD",
                "users": []
            }
        ]
    }))
    .into_response()
}

async fn get_groups(State(api): State<MockApi>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(body) = api.raw_body {
        return body.into_response();
    }

    Json(json!({
        "groups": [
            {
                "id": 0,
                "name": "Non-group expenses",
                "members": []
            },
            {
                "id": 7,
                "name": "Flat 4B",
                "group_type": "apartment",
                "members": [
                    {
                        "id": 1,
                        "first_name": "Ana",
                        "last_name": "Ruiz",
                        "balance": [{ "currency_code": "CAD", "amount": "21.05" }]
                    }
                ]
            }
        ]
    }))
    .into_response()
}

async fn spawn_mock(api: MockApi) -> String {
    let app = Router::new()
        .route("/api/v3.0/get_expenses", get(get_expenses))
        .route("/api/v3.0/get_groups", get(get_groups))
        .with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api/v3.0/", addr)
}

/// Each test owns its key variable so parallel tests never race on it
fn client_for(base_url: String, key_var: &str, key: Option<&str>, timeout_secs: u64) -> SplitwiseClient {
    match key {
        Some(value) => unsafe { std::env::set_var(key_var, value) },
        None => unsafe { std::env::remove_var(key_var) },
    }

    let config = UpstreamConfig {
        base_url,
        timeout_secs,
        api_key_env: EnvSecret::new(key_var),
    };
    SplitwiseClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetch_expenses_decodes_payload() {
    let api = MockApi::default();
    let base_url = spawn_mock(api.clone()).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_1", Some(API_KEY), 5);

    let expenses = client.fetch_expenses(7, 10).await.unwrap();

    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].id, 902);
    assert_eq!(expenses[0].group_id, Some(7));
    assert_eq!(expenses[0].users.len(), 2);
    assert_eq!(expenses[0].users[0].user.full_name(), "Ana Ruiz");
    assert_eq!(expenses[0].users[1].user.full_name(), "Ben");
    assert_eq!(expenses[0].extra.get("payment"), Some(&Value::Bool(false)));
    assert_eq!(expenses[1].id, 901);
}

#[tokio::test]
async fn test_fetch_expenses_sends_group_and_limit() {
    let api = MockApi::default();
    let base_url = spawn_mock(api.clone()).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_2", Some(API_KEY), 5);

    client.fetch_expenses(42, 10).await.unwrap();

    let seen = api.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].get("group_id").map(String::as_str), Some("42"));
    assert_eq!(seen[0].get("limit").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn test_fetch_groups_keeps_unmodeled_fields() {
    let base_url = spawn_mock(MockApi::default()).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_3", Some(API_KEY), 5);

    let groups = client.fetch_groups().await.unwrap();

    assert_eq!(groups.groups.len(), 2);
    let flat = groups.find(7).unwrap();
    assert_eq!(flat.extra.get("group_type"), Some(&json!("apartment")));
    assert_eq!(flat.members[0].balance[0].currency_code, "CAD");
    assert_eq!(flat.members[0].balance[0].amount, "21.05");
}

#[tokio::test]
async fn test_wrong_key_is_status_error() {
    let base_url = spawn_mock(MockApi::default()).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_4", Some("wrong"), 5);

    let err = client.fetch_expenses(7, 10).await.unwrap_err();

    assert!(matches!(
        err,
        BoardError::Upstream(UpstreamError::Status { status: 401 })
    ));
    assert!(err.is_upstream_unavailable());
}

#[tokio::test]
async fn test_missing_key_is_config_error() {
    let api = MockApi::default();
    let base_url = spawn_mock(api.clone()).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_5", None, 5);

    let err = client.fetch_groups().await.unwrap_err();

    match err {
        BoardError::Config(ConfigError::MissingVar { name }) => {
            assert_eq!(name, "SPLIT_BOARD_UT_KEY_5");
        }
        other => panic!("expected MissingVar, got {:?}", other),
    }
    assert!(api.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let api = MockApi {
        raw_body: Some("<html>maintenance</html>"),
        ..MockApi::default()
    };
    let base_url = spawn_mock(api).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_6", Some(API_KEY), 5);

    let err = client.fetch_expenses(7, 10).await.unwrap_err();

    assert!(matches!(
        err,
        BoardError::Upstream(UpstreamError::Decode { .. })
    ));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let api = MockApi {
        delay: Some(Duration::from_secs(3)),
        ..MockApi::default()
    };
    let base_url = spawn_mock(api).await;
    let client = client_for(base_url, "SPLIT_BOARD_UT_KEY_7", Some(API_KEY), 1);

    let err = client.fetch_expenses(7, 10).await.unwrap_err();

    assert!(matches!(
        err,
        BoardError::Upstream(UpstreamError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_unreachable_upstream_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(
        format!("http://{}/api/v3.0", addr),
        "SPLIT_BOARD_UT_KEY_8",
        Some(API_KEY),
        2,
    );

    let err = client.fetch_groups().await.unwrap_err();

    assert!(matches!(
        err,
        BoardError::Upstream(UpstreamError::Transport { .. })
    ));
}
