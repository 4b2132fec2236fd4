use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One physical quantity of a medication at a UBS, tracked per lot with its
/// own expiry date. Unique on (medication_id, ubs_id, lot_code).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_lots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub medication_id: i64,
    pub ubs_id: i64,
    pub lot_code: String,
    pub quantity: i32,
    pub expiry_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::medication::Entity",
        from = "Column::MedicationId",
        to = "super::medication::Column::Id"
    )]
    Medication,
    #[sea_orm(
        belongs_to = "super::health_unit::Entity",
        from = "Column::UbsId",
        to = "super::health_unit::Column::Id"
    )]
    HealthUnit,
    #[sea_orm(has_many = "super::withdrawal_item::Entity")]
    WithdrawalItems,
}

impl Related<super::medication::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Medication.def()
    }
}

impl Related<super::health_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthUnit.def()
    }
}

impl Related<super::withdrawal_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WithdrawalItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
