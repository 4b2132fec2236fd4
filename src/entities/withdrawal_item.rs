use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub withdrawal_id: i64,
    pub medication_id: i64,
    pub stock_lot_id: i64,
    pub quantity: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::withdrawal::Entity",
        from = "Column::WithdrawalId",
        to = "super::withdrawal::Column::Id"
    )]
    Withdrawal,
    #[sea_orm(
        belongs_to = "super::stock_lot::Entity",
        from = "Column::StockLotId",
        to = "super::stock_lot::Column::Id"
    )]
    StockLot,
    #[sea_orm(
        belongs_to = "super::medication::Entity",
        from = "Column::MedicationId",
        to = "super::medication::Column::Id"
    )]
    Medication,
}

impl Related<super::withdrawal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawal.def()
    }
}

impl Related<super::stock_lot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLot.def()
    }
}

impl Related<super::medication::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Medication.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
