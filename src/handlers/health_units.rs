use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{AppState, CallerId};
use crate::errors::ServiceError;
use crate::services::health_units::HealthUnitInput;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub fn health_unit_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_health_units).post(create_health_unit))
        .route("/:id", get(get_health_unit).put(update_health_unit))
        .route("/:id/active", put(set_health_unit_active))
}

/// List active health units
#[utoipa::path(
    get,
    path = "/api/v1/health-units",
    responses(
        (status = 200, description = "Health unit directory returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "health-units"
)]
pub async fn list_health_units(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let units = state.health_unit_service.list_active_units().await?;
    Ok(Json(json!({ "success": true, "health_units": units })))
}

/// Fetch one health unit
#[utoipa::path(
    get,
    path = "/api/v1/health-units/{id}",
    params(("id" = i64, Path, description = "Health unit ID")),
    responses(
        (status = 200, description = "Health unit returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "health-units"
)]
pub async fn get_health_unit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let unit = state.health_unit_service.get_unit(id).await?;
    Ok(Json(json!({ "success": true, "health_unit": unit })))
}

/// Register a health unit
#[utoipa::path(
    post,
    path = "/api/v1/health-units",
    request_body = HealthUnitInput,
    responses(
        (status = 201, description = "Health unit created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "health-units"
)]
pub async fn create_health_unit(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Json(input): Json<HealthUnitInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .health_unit_service
        .create_unit(Some(caller.0), input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "health_unit": created })),
    ))
}

/// Update a health unit
#[utoipa::path(
    put,
    path = "/api/v1/health-units/{id}",
    params(("id" = i64, Path, description = "Health unit ID")),
    request_body = HealthUnitInput,
    responses(
        (status = 200, description = "Health unit updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "health-units"
)]
pub async fn update_health_unit(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(input): Json<HealthUnitInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .health_unit_service
        .update_unit(Some(caller.0), id, input)
        .await?;
    Ok(Json(json!({ "success": true, "health_unit": updated })))
}

/// Activate or deactivate a health unit
#[utoipa::path(
    put,
    path = "/api/v1/health-units/{id}/active",
    params(("id" = i64, Path, description = "Health unit ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Health unit state changed"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "health-units"
)]
pub async fn set_health_unit_active(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(body): Json<SetActiveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .health_unit_service
        .set_unit_active(Some(caller.0), id, body.active)
        .await?;
    Ok(Json(json!({ "success": true })))
}
