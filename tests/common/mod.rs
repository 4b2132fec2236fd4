// Not every test binary touches every helper.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use medcontrol_api::{
    config::{AppConfig, ReservationGuard},
    db,
    entities::{health_unit, medication, stock_lot},
    events::{process_events, EventSender},
    services::{
        AvailabilityService, CatalogService, HealthUnitService, ReservationService, StockService,
        WithdrawalService,
    },
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::sync::mpsc;

/// Test harness backed by an in-memory SQLite database.
///
/// The pool is pinned to a single connection: every connection to
/// `sqlite::memory:` gets its own database, so a larger pool would hand
/// queries an empty schema.
pub struct TestCtx {
    pub db: Arc<DatabaseConnection>,
    pub event_sender: EventSender,
    pub availability: AvailabilityService,
    pub catalog: CatalogService,
    pub health_units: HealthUnitService,
    pub reservations: ReservationService,
    pub stock: StockService,
    pub withdrawals: WithdrawalService,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestCtx {
    pub async fn new() -> Self {
        Self::with_guard(ReservationGuard::Serialized).await
    }

    pub async fn with_guard(guard: ReservationGuard) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let db = Arc::new(pool);
        let (tx, rx) = mpsc::channel(64);
        let event_sender = EventSender::new(tx);
        let event_task = tokio::spawn(process_events(rx, db.clone()));

        Self {
            availability: AvailabilityService::new(db.clone()),
            catalog: CatalogService::new(db.clone(), event_sender.clone()),
            health_units: HealthUnitService::new(db.clone(), event_sender.clone()),
            reservations: ReservationService::new(db.clone(), event_sender.clone(), guard),
            stock: StockService::new(db.clone(), event_sender.clone()),
            withdrawals: WithdrawalService::new(db.clone(), event_sender.clone()),
            db,
            event_sender,
            _event_task: event_task,
        }
    }

    pub async fn seed_medication(&self, name: &str, ingredient: &str) -> i64 {
        let model = medication::ActiveModel {
            commercial_name: Set(name.to_string()),
            active_ingredient: Set(ingredient.to_string()),
            concentration: Set(Some("500mg".to_string())),
            presentation: Set(Some("tablet".to_string())),
            administration_route: Set(Some("oral".to_string())),
            controlled: Set(false),
            active: Set(true),
            ..Default::default()
        };
        model.insert(&*self.db).await.expect("seed medication").id
    }

    pub async fn seed_health_unit(&self, name: &str) -> i64 {
        let model = health_unit::ActiveModel {
            name: Set(name.to_string()),
            address: Set(format!("{} address", name)),
            latitude: Set(None),
            longitude: Set(None),
            active: Set(true),
            ..Default::default()
        };
        model.insert(&*self.db).await.expect("seed health unit").id
    }

    /// Seeds a lot expiring `expiry_days` from today (negative for expired).
    pub async fn seed_lot(
        &self,
        medication_id: i64,
        ubs_id: i64,
        lot_code: &str,
        quantity: i32,
        expiry_days: i64,
    ) -> i64 {
        let model = stock_lot::ActiveModel {
            medication_id: Set(medication_id),
            ubs_id: Set(ubs_id),
            lot_code: Set(lot_code.to_string()),
            quantity: Set(quantity),
            expiry_date: Set(days_from_today(expiry_days)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        model.insert(&*self.db).await.expect("seed stock lot").id
    }
}

pub fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

pub fn pickup_tomorrow() -> chrono::NaiveDateTime {
    (Utc::now() + Duration::days(1)).naive_utc()
}
