//! Health and version endpoints, mounted outside the versioned API.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::db;

/// Liveness: the process is up and serving.
pub async fn liveness_check() -> impl IntoResponse {
    Json(json!({ "alive": true }))
}

/// Readiness: the database answers a ping.
pub async fn readiness_check(State(pool): State<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match db::check_connection(&pool).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ready": true }))),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "ready": false })),
            )
        }
    }
}

/// Build and version information.
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn health_routes(db_pool: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
        .with_state(db_pool)
}
