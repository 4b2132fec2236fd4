//! Reservation Lifecycle Manager
//!
//! Creates, cancels, reschedules and lists patient reservations. A
//! reservation is ACTIVE from creation until explicitly cancelled; there is
//! no fulfilled or auto-expired transition, so an abandoned reservation keeps
//! counting against availability.

use chrono::{NaiveDateTime, Utc};
use dashmap::DashMap;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::ReservationGuard;
use crate::entities::reservation::{self, ReservationStatus};
use crate::entities::{health_unit, medication};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::availability;

/// Command to create a reservation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReservationCommand {
    pub user_id: i64,
    pub medication_id: i64,
    pub ubs_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    pub pickup_time: NaiveDateTime,
}

/// The created reservation record, returned to the patient as a digital
/// receipt.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReservationReceipt {
    pub id: i64,
    pub user_id: i64,
    pub medication_id: i64,
    pub ubs_id: i64,
    pub quantity: i32,
    pub pickup_time: NaiveDateTime,
    pub status: String,
}

impl From<reservation::Model> for ReservationReceipt {
    fn from(model: reservation::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            medication_id: model.medication_id,
            ubs_id: model.ubs_id,
            quantity: model.quantity,
            pickup_time: model.pickup_time,
            status: model.status,
        }
    }
}

/// One row of a patient's reservation history, decorated with display names.
#[derive(Debug, Clone, FromQueryResult, Serialize, Deserialize, ToSchema)]
pub struct ReservationRow {
    pub id: i64,
    pub medication_name: String,
    pub ubs_name: String,
    pub quantity: i32,
    pub pickup_time: NaiveDateTime,
    pub status: String,
}

type PairKey = (i64, i64);

/// Service managing the reservation lifecycle.
#[derive(Clone)]
pub struct ReservationService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
    guard: ReservationGuard,
    /// Per-(medication, ubs) creation locks, used only in serialized mode.
    /// Entries are never evicted; the map grows to at most one mutex per
    /// (medication, ubs) pair ever reserved, bounded by catalog size times
    /// UBS count.
    creation_locks: Arc<DashMap<PairKey, Arc<Mutex<()>>>>,
}

impl ReservationService {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        event_sender: EventSender,
        guard: ReservationGuard,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            guard,
            creation_locks: Arc::new(DashMap::new()),
        }
    }

    /// Validates availability and creates an ACTIVE reservation inside one
    /// transaction. The availability check and the insert run on the same
    /// transaction; in serialized mode a per-(medication, ubs) lock closes
    /// the check-then-act window, in legacy mode two concurrent creations
    /// can both pass the check (the original system's behavior).
    #[instrument(skip(self))]
    pub async fn create_reservation(
        &self,
        cmd: CreateReservationCommand,
    ) -> Result<ReservationReceipt, ServiceError> {
        cmd.validate()?;

        let _guard = match self.guard {
            ReservationGuard::Serialized => {
                let lock = self
                    .creation_locks
                    .entry((cmd.medication_id, cmd.ubs_id))
                    .or_default()
                    .clone();
                Some(lock.lock_owned().await)
            }
            ReservationGuard::Legacy => None,
        };

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        let available =
            availability::available_quantity(&txn, cmd.medication_id, cmd.ubs_id).await?;

        if i64::from(cmd.quantity) > available {
            txn.rollback().await.map_err(ServiceError::db_error)?;
            return Err(ServiceError::InsufficientAvailability { available });
        }

        let model = reservation::ActiveModel {
            user_id: Set(cmd.user_id),
            medication_id: Set(cmd.medication_id),
            ubs_id: Set(cmd.ubs_id),
            quantity: Set(cmd.quantity),
            pickup_time: Set(cmd.pickup_time),
            status: Set(ReservationStatus::Active.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = model.insert(&txn).await.map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            reservation_id = created.id,
            medication_id = cmd.medication_id,
            ubs_id = cmd.ubs_id,
            quantity = cmd.quantity,
            "Created reservation"
        );

        self.event_sender
            .send_lossy(Event::ReservationCreated(created.id))
            .await;
        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id: Some(cmd.user_id),
                action: "CREATE".into(),
                entity: "reservations".into(),
                record_id: created.id,
                details: serde_json::to_value(&ReservationReceipt::from(created.clone())).ok(),
            })
            .await;

        Ok(created.into())
    }

    /// Transitions a reservation to CANCELLED only if it is ACTIVE and owned
    /// by the caller. "Doesn't exist", "not yours" and "already cancelled"
    /// all collapse into the same not-found outcome so non-owners cannot
    /// probe which reservations exist.
    #[instrument(skip(self))]
    pub async fn cancel_reservation(
        &self,
        reservation_id: i64,
        user_id: i64,
    ) -> Result<(), ServiceError> {
        let result = reservation::Entity::update_many()
            .col_expr(
                reservation::Column::Status,
                Expr::value(ReservationStatus::Cancelled.as_str()),
            )
            .filter(reservation::Column::Id.eq(reservation_id))
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Reservation not found or not active".to_string(),
            ));
        }

        info!(reservation_id = reservation_id, "Cancelled reservation");

        self.event_sender
            .send_lossy(Event::ReservationCancelled(reservation_id))
            .await;
        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id: Some(user_id),
                action: "CANCEL".into(),
                entity: "reservations".into(),
                record_id: reservation_id,
                details: None,
            })
            .await;

        Ok(())
    }

    /// Updates the pickup time of an ACTIVE reservation owned by the caller.
    /// Availability is not re-validated: the quantity does not change.
    #[instrument(skip(self))]
    pub async fn reschedule_reservation(
        &self,
        reservation_id: i64,
        user_id: i64,
        new_pickup_time: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        let result = reservation::Entity::update_many()
            .col_expr(
                reservation::Column::PickupTime,
                Expr::value(new_pickup_time),
            )
            .filter(reservation::Column::Id.eq(reservation_id))
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::Status.eq(ReservationStatus::Active.as_str()))
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(
                "Reservation not found or not active".to_string(),
            ));
        }

        info!(reservation_id = reservation_id, "Rescheduled reservation");

        self.event_sender
            .send_lossy(Event::ReservationRescheduled(reservation_id))
            .await;
        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id: Some(user_id),
                action: "RESCHEDULE".into(),
                entity: "reservations".into(),
                record_id: reservation_id,
                details: serde_json::to_value(new_pickup_time).ok(),
            })
            .await;

        Ok(())
    }

    /// All reservations of the caller (any status), annotated with the
    /// medication's commercial name and the UBS name, most recently scheduled
    /// first.
    #[instrument(skip(self))]
    pub async fn list_reservations(&self, user_id: i64) -> Result<Vec<ReservationRow>, ServiceError> {
        let rows = reservation::Entity::find()
            .select_only()
            .column(reservation::Column::Id)
            .column_as(medication::Column::CommercialName, "medication_name")
            .column_as(health_unit::Column::Name, "ubs_name")
            .column(reservation::Column::Quantity)
            .column(reservation::Column::PickupTime)
            .column(reservation::Column::Status)
            .join(JoinType::InnerJoin, reservation::Relation::Medication.def())
            .join(JoinType::InnerJoin, reservation::Relation::HealthUnit.def())
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_desc(reservation::Column::PickupTime)
            .into_model::<ReservationRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(quantity: i32) -> CreateReservationCommand {
        CreateReservationCommand {
            user_id: 1,
            medication_id: 1,
            ubs_id: 1,
            quantity,
            pickup_time: "2026-09-01T10:30:00".parse().unwrap(),
        }
    }

    #[test]
    fn zero_quantity_fails_validation() {
        assert!(command(0).validate().is_err());
        assert!(command(-5).validate().is_err());
        assert!(command(1).validate().is_ok());
    }

    #[test]
    fn receipt_preserves_command_fields() {
        let model = reservation::Model {
            id: 7,
            user_id: 1,
            medication_id: 2,
            ubs_id: 3,
            quantity: 4,
            pickup_time: "2026-09-01T10:30:00".parse().unwrap(),
            status: ReservationStatus::Active.as_str().to_string(),
            created_at: Utc::now(),
        };
        let receipt = ReservationReceipt::from(model);
        assert_eq!(receipt.id, 7);
        assert_eq!(receipt.quantity, 4);
        assert_eq!(receipt.status, "ACTIVE");
    }
}
