//! Stock Ledger
//!
//! Lot-level stock administration for a UBS pharmacy: list, create, update
//! and remove lots, plus the lot-existence check used by the intake form.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{health_unit, medication, stock_lot};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateStockLotCommand {
    pub medication_id: i64,
    pub ubs_id: i64,
    #[validate(length(min = 1, message = "lot_code must not be blank"))]
    pub lot_code: String,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStockLotCommand {
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    pub quantity: i32,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CheckLotQuery {
    pub medication_id: i64,
    pub ubs_id: i64,
    pub lot_code: String,
}

/// One ledger row for the UBS stock screen, with display names joined in.
#[derive(Debug, Clone, FromQueryResult, Serialize, Deserialize, ToSchema)]
pub struct StockLotRow {
    pub id: i64,
    pub medication_id: i64,
    pub medication_name: String,
    pub ubs_id: i64,
    pub ubs_name: String,
    pub lot_code: String,
    pub quantity: i32,
    pub expiry_date: NaiveDate,
}

#[derive(Clone)]
pub struct StockService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl StockService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Full ledger of one UBS, expired and empty lots included, ordered by
    /// medication name then expiry.
    #[instrument(skip(self))]
    pub async fn list_stock(&self, ubs_id: i64) -> Result<Vec<StockLotRow>, ServiceError> {
        let rows = stock_lot::Entity::find()
            .select_only()
            .column(stock_lot::Column::Id)
            .column(stock_lot::Column::MedicationId)
            .column_as(medication::Column::CommercialName, "medication_name")
            .column(stock_lot::Column::UbsId)
            .column_as(health_unit::Column::Name, "ubs_name")
            .column(stock_lot::Column::LotCode)
            .column(stock_lot::Column::Quantity)
            .column(stock_lot::Column::ExpiryDate)
            .join(JoinType::InnerJoin, stock_lot::Relation::Medication.def())
            .join(JoinType::InnerJoin, stock_lot::Relation::HealthUnit.def())
            .filter(stock_lot::Column::UbsId.eq(ubs_id))
            .order_by_asc(medication::Column::CommercialName)
            .order_by_asc(stock_lot::Column::ExpiryDate)
            .into_model::<StockLotRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows)
    }

    /// Registers a new lot. The (medication, ubs, lot_code) key is unique;
    /// hitting the constraint maps to a conflict instead of a server error.
    #[instrument(skip(self, cmd), fields(medication_id = cmd.medication_id, ubs_id = cmd.ubs_id))]
    pub async fn create_stock_lot(
        &self,
        actor_id: Option<i64>,
        cmd: CreateStockLotCommand,
    ) -> Result<stock_lot::Model, ServiceError> {
        cmd.validate()?;

        let model = stock_lot::ActiveModel {
            medication_id: Set(cmd.medication_id),
            ubs_id: Set(cmd.ubs_id),
            lot_code: Set(cmd.lot_code.clone()),
            quantity: Set(cmd.quantity),
            expiry_date: Set(cmd.expiry_date),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        let created = match model.insert(&*self.db_pool).await {
            Ok(created) => created,
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Err(ServiceError::Conflict(format!(
                        "Lot {} already registered for this medication at this UBS",
                        cmd.lot_code
                    )));
                }
                return Err(ServiceError::db_error(e));
            }
        };

        info!(stock_lot_id = created.id, "Registered stock lot");

        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id,
                action: "CREATE".into(),
                entity: "stock_lots".into(),
                record_id: created.id,
                details: serde_json::to_value(&created).ok(),
            })
            .await;

        Ok(created)
    }

    /// Overwrites quantity and expiry of an existing lot.
    #[instrument(skip(self, cmd))]
    pub async fn update_stock_lot(
        &self,
        actor_id: Option<i64>,
        lot_id: i64,
        cmd: UpdateStockLotCommand,
    ) -> Result<stock_lot::Model, ServiceError> {
        cmd.validate()?;

        let existing = stock_lot::Entity::find_by_id(lot_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Stock lot {} not found", lot_id)))?;

        let mut active: stock_lot::ActiveModel = existing.into();
        active.quantity = Set(cmd.quantity);
        active.expiry_date = Set(cmd.expiry_date);
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id,
                action: "UPDATE".into(),
                entity: "stock_lots".into(),
                record_id: lot_id,
                details: serde_json::to_value(&updated).ok(),
            })
            .await;

        Ok(updated)
    }

    /// Removes a lot from the ledger. Withdrawal history keeps referencing it
    /// only while it exists, so deletion is reserved for intake mistakes.
    #[instrument(skip(self))]
    pub async fn delete_stock_lot(
        &self,
        actor_id: Option<i64>,
        lot_id: i64,
    ) -> Result<(), ServiceError> {
        let result = stock_lot::Entity::delete_by_id(lot_id)
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Stock lot {} not found",
                lot_id
            )));
        }

        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id,
                action: "DELETE".into(),
                entity: "stock_lots".into(),
                record_id: lot_id,
                details: None,
            })
            .await;

        Ok(())
    }

    /// Whether a lot with this code already exists for the pair. Backs the
    /// intake form's pre-check before a create is attempted.
    #[instrument(skip(self, query))]
    pub async fn lot_exists(&self, query: CheckLotQuery) -> Result<bool, ServiceError> {
        let count = stock_lot::Entity::find()
            .filter(stock_lot::Column::MedicationId.eq(query.medication_id))
            .filter(stock_lot::Column::UbsId.eq(query.ubs_id))
            .filter(stock_lot::Column::LotCode.eq(query.lot_code))
            .count(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_quantity_fails_validation() {
        let cmd = CreateStockLotCommand {
            medication_id: 1,
            ubs_id: 1,
            lot_code: "L-001".into(),
            quantity: -1,
            expiry_date: "2027-01-01".parse().unwrap(),
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn blank_lot_code_fails_validation() {
        let cmd = CreateStockLotCommand {
            medication_id: 1,
            ubs_id: 1,
            lot_code: "".into(),
            quantity: 10,
            expiry_date: "2027-01-01".parse().unwrap(),
        };
        assert!(cmd.validate().is_err());
    }
}
