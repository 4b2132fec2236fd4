pub mod availability;
pub mod catalog;
pub mod health_units;
pub mod reservations;
pub mod stock;
pub mod withdrawals;

pub use availability::AvailabilityService;
pub use catalog::CatalogService;
pub use health_units::HealthUnitService;
pub use reservations::ReservationService;
pub use stock::StockService;
pub use withdrawals::WithdrawalService;
