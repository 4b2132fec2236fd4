use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation.
///
/// ACTIVE is the only state that counts against availability. There is no
/// fulfilled or auto-expired state: a reservation that is never cancelled
/// stays ACTIVE and keeps suppressing availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "ACTIVE",
            ReservationStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ReservationStatus::Active),
            "CANCELLED" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Opaque caller identity supplied by the authentication front.
    pub user_id: i64,
    pub medication_id: i64,
    pub ubs_id: i64,
    pub quantity: i32,
    /// Scheduled pickup time, wall-clock local time as sent by the client.
    pub pickup_time: NaiveDateTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
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

impl ActiveModelBehavior for ActiveModel {}
