use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::IntoParams;

use super::{AppState, CallerId};
use crate::errors::ServiceError;
use crate::services::stock::{CheckLotQuery, CreateStockLotCommand, UpdateStockLotCommand};

#[derive(Debug, Deserialize, IntoParams)]
pub struct StockListParams {
    pub ubs_id: i64,
}

pub fn stock_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_stock).post(create_stock_lot))
        .route("/check-lot", post(check_lot))
        .route("/:id", put(update_stock_lot).delete(delete_stock_lot))
}

/// Full stock ledger of one UBS
#[utoipa::path(
    get,
    path = "/api/v1/stock",
    params(StockListParams),
    responses(
        (status = 200, description = "Stock ledger returned", body = [crate::services::stock::StockLotRow]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn list_stock(
    State(state): State<Arc<AppState>>,
    _caller: CallerId,
    Query(params): Query<StockListParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.stock_service.list_stock(params.ubs_id).await?;
    Ok(Json(json!({ "success": true, "stock": rows })))
}

/// Register a new stock lot
#[utoipa::path(
    post,
    path = "/api/v1/stock",
    request_body = CreateStockLotCommand,
    responses(
        (status = 201, description = "Stock lot created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lot code already registered for this pair", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn create_stock_lot(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Json(cmd): Json<CreateStockLotCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state
        .stock_service
        .create_stock_lot(Some(caller.0), cmd)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "stock_lot": created })),
    ))
}

/// Check whether a lot code is already registered
#[utoipa::path(
    post,
    path = "/api/v1/stock/check-lot",
    request_body = CheckLotQuery,
    responses(
        (status = 200, description = "Existence flag returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn check_lot(
    State(state): State<Arc<AppState>>,
    _caller: CallerId,
    Json(query): Json<CheckLotQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let exists = state.stock_service.lot_exists(query).await?;
    Ok(Json(json!({ "exists": exists })))
}

/// Overwrite quantity and expiry of a lot
#[utoipa::path(
    put,
    path = "/api/v1/stock/{id}",
    params(("id" = i64, Path, description = "Stock lot ID")),
    request_body = UpdateStockLotCommand,
    responses(
        (status = 200, description = "Stock lot updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn update_stock_lot(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
    Json(cmd): Json<UpdateStockLotCommand>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state
        .stock_service
        .update_stock_lot(Some(caller.0), id, cmd)
        .await?;
    Ok(Json(json!({ "success": true, "stock_lot": updated })))
}

/// Remove a lot registered by mistake
#[utoipa::path(
    delete,
    path = "/api/v1/stock/{id}",
    params(("id" = i64, Path, description = "Stock lot ID")),
    responses(
        (status = 200, description = "Stock lot deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn delete_stock_lot(
    State(state): State<Arc<AppState>>,
    caller: CallerId,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .stock_service
        .delete_stock_lot(Some(caller.0), id)
        .await?;
    Ok(Json(json!({ "success": true })))
}
