//! Availability Calculator
//!
//! For a (medication, UBS) pair:
//! `available = physical stock not expired − sum of ACTIVE reservations`.
//! Recomputed on every read, never cached, never persisted. The raw value can
//! go negative after legacy races; callers that display availability clamp it
//! to zero, while the reservation admission check uses the raw value.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::reservation::{self, ReservationStatus};
use crate::entities::stock_lot;
use crate::errors::ServiceError;

/// Sum of stock-lot quantities for the pair, excluding empty lots and lots
/// whose expiry date is today or earlier.
pub async fn physical_stock<C: ConnectionTrait>(
    conn: &C,
    medication_id: i64,
    ubs_id: i64,
) -> Result<i64, ServiceError> {
    let today = Utc::now().date_naive();

    let total: Option<Option<i64>> = stock_lot::Entity::find()
        .select_only()
        .column_as(stock_lot::Column::Quantity.sum(), "total")
        .filter(stock_lot::Column::MedicationId.eq(medication_id))
        .filter(stock_lot::Column::UbsId.eq(ubs_id))
        .filter(stock_lot::Column::Quantity.gt(0))
        .filter(stock_lot::Column::ExpiryDate.gt(today))
        .into_tuple()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(total.flatten().unwrap_or(0))
}

/// Sum of quantities held by ACTIVE reservations for the pair.
pub async fn reserved_quantity<C: ConnectionTrait>(
    conn: &C,
    medication_id: i64,
    ubs_id: i64,
) -> Result<i64, ServiceError> {
    let total: Option<Option<i64>> = reservation::Entity::find()
        .select_only()
        .column_as(reservation::Column::Quantity.sum(), "total")
        .filter(reservation::Column::MedicationId.eq(medication_id))
        .filter(reservation::Column::UbsId.eq(ubs_id))
        .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
        .into_tuple()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?;

    Ok(total.flatten().unwrap_or(0))
}

/// Raw availability for the pair. Generic over the connection so the
/// reservation admission check can run it inside its own transaction.
pub async fn available_quantity<C: ConnectionTrait>(
    conn: &C,
    medication_id: i64,
    ubs_id: i64,
) -> Result<i64, ServiceError> {
    let physical = physical_stock(conn, medication_id, ubs_id).await?;
    let reserved = reserved_quantity(conn, medication_id, ubs_id).await?;
    Ok(physical - reserved)
}

/// Read-side service for availability display.
#[derive(Clone)]
pub struct AvailabilityService {
    db_pool: Arc<DatabaseConnection>,
}

impl AvailabilityService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Availability clamped to zero for display purposes.
    #[instrument(skip(self))]
    pub async fn display_availability(
        &self,
        medication_id: i64,
        ubs_id: i64,
    ) -> Result<i64, ServiceError> {
        let raw = available_quantity(&*self.db_pool, medication_id, ubs_id).await?;
        Ok(raw.max(0))
    }
}
