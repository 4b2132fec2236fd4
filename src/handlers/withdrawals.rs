use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{AppState, CallerId};
use crate::errors::ServiceError;
use crate::services::withdrawals::{RecordWithdrawalCommand, WithdrawalItemInput};

/// Request body for recording a dispensation. The authenticated caller is
/// the pharmacist; `user_id` identifies the patient being served.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordWithdrawalRequest {
    pub user_id: i64,
    pub ubs_id: i64,
    pub items: Vec<WithdrawalItemInput>,
}

pub fn withdrawal_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(record_withdrawal))
}

/// Record a medication withdrawal at the counter
///
/// All lot decrements and the withdrawal record succeed or fail together; a
/// lot that cannot cover its item aborts the whole request.
#[utoipa::path(
    post,
    path = "/api/v1/withdrawals",
    request_body = RecordWithdrawalRequest,
    responses(
        (status = 201, description = "Withdrawal recorded", body = crate::services::withdrawals::WithdrawalRecord),
        (status = 400, description = "Invalid request or insufficient lot quantity", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "withdrawals"
)]
pub async fn record_withdrawal(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Json(payload): Json<RecordWithdrawalRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state
        .withdrawal_service
        .record_withdrawal(
            caller.0,
            RecordWithdrawalCommand {
                user_id: payload.user_id,
                ubs_id: payload.ubs_id,
                items: payload.items,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "withdrawal": record })),
    ))
}

/// Withdrawal history of the calling user
#[utoipa::path(
    get,
    path = "/api/v1/users/me/withdrawals",
    responses(
        (status = 200, description = "Withdrawal history returned", body = [crate::services::withdrawals::WithdrawalHistoryRow]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "withdrawals"
)]
pub async fn list_my_withdrawals(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state
        .withdrawal_service
        .list_user_withdrawals(caller.0)
        .await?;
    Ok(Json(json!({ "success": true, "withdrawals": rows })))
}
