pub mod audit_log;
pub mod health_unit;
pub mod medication;
pub mod reservation;
pub mod search_log;
pub mod stock_lot;
pub mod withdrawal;
pub mod withdrawal_item;
