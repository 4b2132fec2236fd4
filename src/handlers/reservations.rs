use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{AppState, CallerId};
use crate::errors::ServiceError;
use crate::services::reservations::CreateReservationCommand;

/// Request body for creating a reservation. The caller identity comes from
/// the `X-User-ID` header, not the body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub medication_id: i64,
    pub ubs_id: i64,
    pub quantity: i32,
    /// Local pickup time, e.g. `2026-09-01T10:30:00`.
    pub pickup_time: NaiveDateTime,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RescheduleRequest {
    pub pickup_time: NaiveDateTime,
}

pub fn reservation_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_reservation))
        .route("/:id/cancel", put(cancel_reservation))
        .route("/:id/reschedule", put(reschedule_reservation))
}

/// Routes scoped to the calling user, nested under `/users/me`.
pub fn user_scope_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_my_reservations))
        .route("/withdrawals", get(super::withdrawals::list_my_withdrawals))
}

/// Reserve a medication for pickup
///
/// Availability is checked and the reservation inserted in one transaction;
/// asking for more than is available fails with the remaining quantity in
/// the error message.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = crate::services::reservations::ReservationReceipt),
        (status = 400, description = "Invalid request or insufficient availability", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reservations"
)]
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Json(payload): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let receipt = state
        .reservation_service
        .create_reservation(CreateReservationCommand {
            user_id: caller.0,
            medication_id: payload.medication_id,
            ubs_id: payload.ubs_id,
            quantity: payload.quantity,
            pickup_time: payload.pickup_time,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "reservation": receipt })),
    ))
}

/// Cancel an active reservation owned by the caller
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/cancel",
    params(("id" = i64, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found, not owned, or not active", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reservations"
)]
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .reservation_service
        .cancel_reservation(id, caller.0)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Move the pickup time of an active reservation owned by the caller
#[utoipa::path(
    put,
    path = "/api/v1/reservations/{id}/reschedule",
    params(("id" = i64, Path, description = "Reservation ID")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Reservation rescheduled"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found, not owned, or not active", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reservations"
)]
pub async fn reschedule_reservation(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(payload): Json<RescheduleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .reservation_service
        .reschedule_reservation(id, caller.0, payload.pickup_time)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Reservation history of the calling user
///
/// Returns a bare array, most recently scheduled first.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/reservations",
    responses(
        (status = 200, description = "Reservation history returned", body = [crate::services::reservations::ReservationRow]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "reservations"
)]
pub async fn list_my_reservations(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.reservation_service.list_reservations(caller.0).await?;
    Ok(Json(rows))
}
