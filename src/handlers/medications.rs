use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::{AppState, CallerId};
use crate::errors::ServiceError;
use crate::services::catalog::MedicationInput;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Commercial name or active ingredient, matched case-insensitively.
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    pub ubs_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub active: bool,
}

pub fn medication_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_medications).post(create_medication))
        .route("/search", get(search_medications))
        .route("/:id", put(update_medication))
        .route("/:id/active", put(set_medication_active))
        .route("/:id/availability", get(get_availability))
}

/// List the full medication catalog
#[utoipa::path(
    get,
    path = "/api/v1/medications",
    responses(
        (status = 200, description = "Medication catalog returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "medications"
)]
pub async fn list_medications(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServiceError> {
    let medications = state.catalog_service.list_medications().await?;
    Ok(Json(json!({ "success": true, "medications": medications })))
}

/// Register a medication in the catalog
#[utoipa::path(
    post,
    path = "/api/v1/medications",
    request_body = MedicationInput,
    responses(
        (status = 201, description = "Medication created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "medications"
)]
pub async fn create_medication(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Json(input): Json<MedicationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .catalog_service
        .create_medication(Some(caller.0), input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "medication": created })),
    ))
}

/// Update a catalog entry
#[utoipa::path(
    put,
    path = "/api/v1/medications/{id}",
    params(("id" = i64, Path, description = "Medication ID")),
    request_body = MedicationInput,
    responses(
        (status = 200, description = "Medication updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "medications"
)]
pub async fn update_medication(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(input): Json<MedicationInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .catalog_service
        .update_medication(Some(caller.0), id, input)
        .await?;
    Ok(Json(json!({ "success": true, "medication": updated })))
}

/// Activate or deactivate a catalog entry
#[utoipa::path(
    put,
    path = "/api/v1/medications/{id}/active",
    params(("id" = i64, Path, description = "Medication ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 200, description = "Medication state changed"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "medications"
)]
pub async fn set_medication_active(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(body): Json<SetActiveRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .catalog_service
        .set_medication_active(Some(caller.0), id, body.active)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Search medications by name or active ingredient
///
/// Returns a bare array: every active UBS that can actually fulfill a pickup
/// today, with availability already net of active reservations.
#[utoipa::path(
    get,
    path = "/api/v1/medications/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Search results returned", body = [crate::services::catalog::SearchResult]),
        (status = 400, description = "Blank search term", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "medications"
)]
pub async fn search_medications(
    State(state): State<Arc<AppState>>,
    caller: Option<CallerId>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let results = state
        .catalog_service
        .search_medications(&params.name, caller.map(|c| c.0))
        .await?;
    Ok(Json(results))
}

/// Current availability of a medication at one UBS
#[utoipa::path(
    get,
    path = "/api/v1/medications/{id}/availability",
    params(
        ("id" = i64, Path, description = "Medication ID"),
        AvailabilityParams
    ),
    responses(
        (status = 200, description = "Availability returned"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "medications"
)]
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<AvailabilityParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let available = state
        .availability_service
        .display_availability(id, params.ubs_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "medication_id": id,
        "ubs_id": params.ubs_id,
        "available_quantity": available
    })))
}
