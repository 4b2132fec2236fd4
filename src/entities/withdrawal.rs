use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Header row for one dispensing transaction at a UBS counter.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Patient receiving the medication.
    pub user_id: i64,
    pub ubs_id: i64,
    /// Pharmacist recording the withdrawal.
    pub pharmacist_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::withdrawal_item::Entity")]
    Items,
    #[sea_orm(
        belongs_to = "super::health_unit::Entity",
        from = "Column::UbsId",
        to = "super::health_unit::Column::Id"
    )]
    HealthUnit,
}

impl Related<super::withdrawal_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::health_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthUnit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
