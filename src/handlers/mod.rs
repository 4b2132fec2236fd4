//! HTTP layer: one module per resource, each exposing a `Router<Arc<AppState>>`.

pub mod health_units;
pub mod medications;
pub mod reservations;
pub mod stock;
pub mod withdrawals;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::events::EventSender;
use crate::services::{
    AvailabilityService, CatalogService, HealthUnitService, ReservationService, StockService,
    WithdrawalService,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub availability_service: AvailabilityService,
    pub catalog_service: CatalogService,
    pub health_unit_service: HealthUnitService,
    pub reservation_service: ReservationService,
    pub stock_service: StockService,
    pub withdrawal_service: WithdrawalService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig, event_sender: EventSender) -> Self {
        let guard = config.reservation_guard();
        Self {
            availability_service: AvailabilityService::new(db.clone()),
            catalog_service: CatalogService::new(db.clone(), event_sender.clone()),
            health_unit_service: HealthUnitService::new(db.clone(), event_sender.clone()),
            reservation_service: ReservationService::new(db.clone(), event_sender.clone(), guard),
            stock_service: StockService::new(db.clone(), event_sender.clone()),
            withdrawal_service: WithdrawalService::new(db.clone(), event_sender.clone()),
            db,
            config,
            event_sender,
        }
    }
}

/// Caller identity taken from the `X-User-ID` header.
///
/// Identity management lives upstream; this service trusts the header as an
/// opaque numeric id and rejects requests that lack one.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing X-User-ID header".to_string()))?;

        value
            .parse::<i64>()
            .map(CallerId)
            .map_err(|_| ServiceError::Unauthorized("Invalid X-User-ID header".to_string()))
    }
}

/// All versioned API routes, to be nested under `/api/v1`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/medications", medications::medication_routes())
        .nest("/health-units", health_units::health_unit_routes())
        .nest("/reservations", reservations::reservation_routes())
        .nest("/stock", stock::stock_routes())
        .nest("/withdrawals", withdrawals::withdrawal_routes())
        .nest("/users/me", reservations::user_scope_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn caller_id_parses_numeric_header() {
        let request = Request::builder()
            .header("X-User-ID", "42")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let caller = CallerId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(caller.0, 42);
    }

    #[tokio::test]
    async fn caller_id_rejects_missing_and_garbage_headers() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        assert!(CallerId::from_request_parts(&mut parts, &()).await.is_err());

        let request = Request::builder()
            .header("X-User-ID", "not-a-number")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        assert!(CallerId::from_request_parts(&mut parts, &()).await.is_err());
    }
}
