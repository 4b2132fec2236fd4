//! Withdrawal Recorder
//!
//! Records a dispensation at the counter: one withdrawal header plus one line
//! per (medication, lot, quantity), each line decrementing its stock lot.
//! The whole record is one transaction; a single lot without enough quantity
//! aborts everything.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{medication, stock_lot, withdrawal, withdrawal_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WithdrawalItemInput {
    pub medication_id: i64,
    pub stock_lot_id: i64,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordWithdrawalCommand {
    pub user_id: i64,
    pub ubs_id: i64,
    #[validate]
    pub items: Vec<WithdrawalItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalRecord {
    pub id: i64,
    pub user_id: i64,
    pub ubs_id: i64,
    pub pharmacist_id: i64,
    pub items: Vec<WithdrawalItemLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalItemLine {
    pub medication_id: i64,
    pub stock_lot_id: i64,
    pub quantity: i32,
}

/// One row of a patient's withdrawal history, with the medication name.
#[derive(Debug, Clone, FromQueryResult, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalHistoryRow {
    pub withdrawal_id: i64,
    pub medication_name: String,
    pub quantity: i32,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Clone)]
pub struct WithdrawalService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl WithdrawalService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a withdrawal performed by `pharmacist_id` on behalf of
    /// `cmd.user_id`. Each item decrements its lot with a guarded update
    /// (`quantity = quantity - n` only where `quantity >= n`); a zero-row
    /// update means the lot cannot cover the item and rolls the whole
    /// transaction back, leaving no header and no partial decrements.
    #[instrument(skip(self, cmd), fields(user_id = cmd.user_id, ubs_id = cmd.ubs_id))]
    pub async fn record_withdrawal(
        &self,
        pharmacist_id: i64,
        cmd: RecordWithdrawalCommand,
    ) -> Result<WithdrawalRecord, ServiceError> {
        cmd.validate()?;
        if cmd.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one withdrawal item is required".to_string(),
            ));
        }

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(ServiceError::db_error)?;

        let header = withdrawal::ActiveModel {
            user_id: Set(cmd.user_id),
            ubs_id: Set(cmd.ubs_id),
            pharmacist_id: Set(pharmacist_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let header = header.insert(&txn).await.map_err(ServiceError::db_error)?;

        let mut lines = Vec::with_capacity(cmd.items.len());
        for item in &cmd.items {
            let line = withdrawal_item::ActiveModel {
                withdrawal_id: Set(header.id),
                medication_id: Set(item.medication_id),
                stock_lot_id: Set(item.stock_lot_id),
                quantity: Set(item.quantity),
                ..Default::default()
            };
            line.insert(&txn).await.map_err(ServiceError::db_error)?;

            let result = stock_lot::Entity::update_many()
                .col_expr(
                    stock_lot::Column::Quantity,
                    Expr::col(stock_lot::Column::Quantity).sub(item.quantity),
                )
                .col_expr(stock_lot::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(stock_lot::Column::Id.eq(item.stock_lot_id))
                .filter(stock_lot::Column::Quantity.gte(item.quantity))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            if result.rows_affected == 0 {
                txn.rollback().await.map_err(ServiceError::db_error)?;
                return Err(ServiceError::InsufficientStock(format!(
                    "Stock lot {} cannot cover quantity {}",
                    item.stock_lot_id, item.quantity
                )));
            }

            lines.push(WithdrawalItemLine {
                medication_id: item.medication_id,
                stock_lot_id: item.stock_lot_id,
                quantity: item.quantity,
            });
        }

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            withdrawal_id = header.id,
            items = lines.len(),
            "Recorded withdrawal"
        );

        let record = WithdrawalRecord {
            id: header.id,
            user_id: header.user_id,
            ubs_id: header.ubs_id,
            pharmacist_id: header.pharmacist_id,
            items: lines,
        };

        self.event_sender
            .send_lossy(Event::WithdrawalRecorded(record.id))
            .await;
        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id: Some(pharmacist_id),
                action: "CREATE".into(),
                entity: "withdrawals".into(),
                record_id: record.id,
                details: serde_json::to_value(&record).ok(),
            })
            .await;

        Ok(record)
    }

    /// Withdrawal history of one patient, newest first, one row per item.
    #[instrument(skip(self))]
    pub async fn list_user_withdrawals(
        &self,
        user_id: i64,
    ) -> Result<Vec<WithdrawalHistoryRow>, ServiceError> {
        let rows = withdrawal_item::Entity::find()
            .select_only()
            .column_as(withdrawal_item::Column::WithdrawalId, "withdrawal_id")
            .column_as(medication::Column::CommercialName, "medication_name")
            .column(withdrawal_item::Column::Quantity)
            .column_as(withdrawal::Column::CreatedAt, "created_at")
            .join(
                JoinType::InnerJoin,
                withdrawal_item::Relation::Withdrawal.def(),
            )
            .join(
                JoinType::InnerJoin,
                withdrawal_item::Relation::Medication.def(),
            )
            .filter(withdrawal::Column::UserId.eq(user_id))
            .order_by_desc(withdrawal::Column::CreatedAt)
            .into_model::<WithdrawalHistoryRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_item_fails_validation() {
        let cmd = RecordWithdrawalCommand {
            user_id: 1,
            ubs_id: 1,
            items: vec![WithdrawalItemInput {
                medication_id: 1,
                stock_lot_id: 1,
                quantity: 0,
            }],
        };
        assert!(cmd.validate().is_err());
    }
}
