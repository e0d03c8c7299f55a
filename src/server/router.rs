//! Route table

use crate::server::handlers::{groups_info, health_check, list_group_expenses};
use crate::server::host::ServerHost;
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application routes
///
/// - GET /groups/info - upstream group list with balances
/// - GET /groups/{group_id}/expenses - sync, then most recent stored expenses
/// - GET /health, GET /healthz - liveness
pub fn build_routes(host: Arc<ServerHost>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/groups/info", get(groups_info))
        .route("/groups/{group_id}/expenses", get(list_group_expenses))
        .layer(TraceLayer::new_for_http())
        .with_state(host)
}
