//! HTTP handlers
//!
//! Failures are logged with their full detail and answered with a fixed
//! message per endpoint; internal errors never reach the client.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::core::error::{BoardError, RequestError};
use crate::server::host::ServerHost;

/// Public message for a failed expense list
pub const EXPENSES_ERROR: &str = "Get Splitwise Expenses Error";

/// Public message for a failed group list
pub const GROUPS_ERROR: &str = "Get Splitwise Data Error";

/// Public message for a malformed group id
pub const INVALID_GROUP_ID: &str = "Invalid group id";

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error already reduced to what the client may see
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    /// Log `err` and map it to the endpoint's public message
    pub fn from_board(err: &BoardError, public_message: &'static str) -> Self {
        match err {
            BoardError::Request(_) => {
                tracing::debug!(error = %err, "Rejected request");
                Self {
                    status: err.status_code(),
                    message: INVALID_GROUP_ID,
                }
            }
            _ => {
                tracing::error!(code = err.error_code(), error = %err, "{}", public_message);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: public_message,
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message.to_string(),
        });
        (self.status, body).into_response()
    }
}

fn parse_group_id(raw: &str) -> Result<i64, BoardError> {
    raw.trim().parse::<i64>().map_err(|_| {
        RequestError::InvalidGroupId {
            value: raw.to_string(),
        }
        .into()
    })
}

fn cached_json<T: Serialize>(host: &ServerHost, body: T) -> Response {
    (
        [(header::CACHE_CONTROL, host.cache_control.clone())],
        Json(body),
    )
        .into_response()
}

/// Sync a group, then list its most recent stored expenses
///
/// GET /groups/{group_id}/expenses
pub async fn list_group_expenses(
    State(host): State<Arc<ServerHost>>,
    Path(group_id): Path<String>,
) -> Result<Response, ApiError> {
    let group_id =
        parse_group_id(&group_id).map_err(|e| ApiError::from_board(&e, EXPENSES_ERROR))?;

    let (_report, expenses) = host
        .refresh_and_list(group_id)
        .await
        .map_err(|e| ApiError::from_board(&e, EXPENSES_ERROR))?;

    Ok(cached_json(&host, expenses))
}

/// Proxy the upstream group list
///
/// GET /groups/info
pub async fn groups_info(State(host): State<Arc<ServerHost>>) -> Result<Response, ApiError> {
    let groups = host
        .groups()
        .await
        .map_err(|e| ApiError::from_board(&e, GROUPS_ERROR))?;

    Ok(cached_json(&host, groups))
}

/// Liveness probe
///
/// GET /health, GET /healthz
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "split-board"
    }))
}
