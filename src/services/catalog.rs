//! Medication catalog: CRUD over the base medication registry plus the
//! patient-facing availability search.

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{health_unit, medication, stock_lot};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::availability;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MedicationInput {
    #[validate(length(min = 1, message = "commercial_name must not be blank"))]
    pub commercial_name: String,
    #[validate(length(min = 1, message = "active_ingredient must not be blank"))]
    pub active_ingredient: String,
    pub concentration: Option<String>,
    pub presentation: Option<String>,
    pub administration_route: Option<String>,
    #[serde(default)]
    pub controlled: bool,
}

/// One search hit: a UBS carrying the searched medication, with the real
/// availability (physical minus active reservations) already computed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    pub medication_id: i64,
    pub ubs_id: i64,
    pub available_quantity: i64,
    pub ubs_name: String,
    pub ubs_address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}

#[derive(Debug, FromQueryResult)]
struct PhysicalStockRow {
    medication_id: i64,
    ubs_id: i64,
    ubs_name: String,
    ubs_address: String,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    physical: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// All medications (active and inactive), ordered by commercial name.
    #[instrument(skip(self))]
    pub async fn list_medications(&self) -> Result<Vec<medication::Model>, ServiceError> {
        medication::Entity::find()
            .order_by_asc(medication::Column::CommercialName)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self, input))]
    pub async fn create_medication(
        &self,
        actor_id: Option<i64>,
        input: MedicationInput,
    ) -> Result<medication::Model, ServiceError> {
        input.validate()?;

        let model = medication::ActiveModel {
            commercial_name: Set(input.commercial_name.clone()),
            active_ingredient: Set(input.active_ingredient.clone()),
            concentration: Set(input.concentration.clone()),
            presentation: Set(input.presentation.clone()),
            administration_route: Set(input.administration_route.clone()),
            controlled: Set(input.controlled),
            active: Set(true),
            ..Default::default()
        };
        let created = model
            .insert(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        info!(medication_id = created.id, "Created medication");

        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id,
                action: "CREATE".into(),
                entity: "medications".into(),
                record_id: created.id,
                details: serde_json::to_value(&created).ok(),
            })
            .await;

        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_medication(
        &self,
        actor_id: Option<i64>,
        medication_id: i64,
        input: MedicationInput,
    ) -> Result<medication::Model, ServiceError> {
        input.validate()?;

        let existing = medication::Entity::find_by_id(medication_id)
            .one(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Medication {} not found", medication_id))
            })?;

        let mut active: medication::ActiveModel = existing.into();
        active.commercial_name = Set(input.commercial_name.clone());
        active.active_ingredient = Set(input.active_ingredient.clone());
        active.concentration = Set(input.concentration.clone());
        active.presentation = Set(input.presentation.clone());
        active.administration_route = Set(input.administration_route.clone());
        active.controlled = Set(input.controlled);

        let updated = active
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id,
                action: "UPDATE".into(),
                entity: "medications".into(),
                record_id: medication_id,
                details: serde_json::to_value(&updated).ok(),
            })
            .await;

        Ok(updated)
    }

    /// Logical activation/deactivation. Deactivated medications disappear
    /// from search but keep their stock and reservation history.
    #[instrument(skip(self))]
    pub async fn set_medication_active(
        &self,
        actor_id: Option<i64>,
        medication_id: i64,
        active: bool,
    ) -> Result<(), ServiceError> {
        let result = medication::Entity::update_many()
            .col_expr(medication::Column::Active, Expr::value(active))
            .filter(medication::Column::Id.eq(medication_id))
            .exec(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Medication {} not found",
                medication_id
            )));
        }

        self.event_sender
            .send_lossy(Event::ActionAudited {
                actor_id,
                action: if active { "ACTIVATE" } else { "DEACTIVATE" }.into(),
                entity: "medications".into(),
                record_id: medication_id,
                details: None,
            })
            .await;

        Ok(())
    }

    /// Case-insensitive search by commercial name or active ingredient.
    ///
    /// Lists every active UBS carrying the medication in non-expired,
    /// positive-quantity lots, computes the real availability per
    /// (medication, UBS) pair and drops entries with nothing left. The
    /// search-log entry goes out fire-and-forget after the results are
    /// assembled.
    #[instrument(skip(self))]
    pub async fn search_medications(
        &self,
        term: &str,
        user_id: Option<i64>,
    ) -> Result<Vec<SearchResult>, ServiceError> {
        let trimmed = term.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::ValidationError(
                "Search term must not be blank".to_string(),
            ));
        }

        let pattern = format!("%{}%", trimmed.to_lowercase());
        let today = chrono::Utc::now().date_naive();

        let rows = stock_lot::Entity::find()
            .select_only()
            .column(stock_lot::Column::MedicationId)
            .column(stock_lot::Column::UbsId)
            .column_as(health_unit::Column::Name, "ubs_name")
            .column_as(health_unit::Column::Address, "ubs_address")
            .column(health_unit::Column::Latitude)
            .column(health_unit::Column::Longitude)
            .column_as(stock_lot::Column::Quantity.sum(), "physical")
            .join(JoinType::InnerJoin, stock_lot::Relation::Medication.def())
            .join(JoinType::InnerJoin, stock_lot::Relation::HealthUnit.def())
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            medication::Entity,
                            medication::Column::CommercialName,
                        ))))
                        .like(&pattern),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            medication::Entity,
                            medication::Column::ActiveIngredient,
                        ))))
                        .like(&pattern),
                    ),
            )
            .filter(stock_lot::Column::Quantity.gt(0))
            .filter(stock_lot::Column::ExpiryDate.gt(today))
            .filter(medication::Column::Active.eq(true))
            .filter(health_unit::Column::Active.eq(true))
            .group_by(stock_lot::Column::MedicationId)
            .group_by(stock_lot::Column::UbsId)
            .group_by(health_unit::Column::Name)
            .group_by(health_unit::Column::Address)
            .group_by(health_unit::Column::Latitude)
            .group_by(health_unit::Column::Longitude)
            .order_by_asc(health_unit::Column::Name)
            .into_model::<PhysicalStockRow>()
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let reserved =
                availability::reserved_quantity(&*self.db_pool, row.medication_id, row.ubs_id)
                    .await?;
            let available = row.physical - reserved;
            if available > 0 {
                results.push(SearchResult {
                    medication_id: row.medication_id,
                    ubs_id: row.ubs_id,
                    available_quantity: available,
                    ubs_name: row.ubs_name,
                    ubs_address: row.ubs_address,
                    latitude: row.latitude,
                    longitude: row.longitude,
                });
            }
        }

        self.event_sender
            .send_lossy(Event::MedicationSearched {
                term: trimmed.to_string(),
                had_results: !results.is_empty(),
                user_id,
                first_medication_id: results.first().map(|r| r.medication_id),
            })
            .await;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_medication_name_fails_validation() {
        let input = MedicationInput {
            commercial_name: "".into(),
            active_ingredient: "dipyrone".into(),
            concentration: None,
            presentation: None,
            administration_route: None,
            controlled: false,
        };
        assert!(input.validate().is_err());
    }
}
