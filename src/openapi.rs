use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MedControl API",
        version = "1.0.0",
        description = r#"
Municipal medication availability and pharmacy inventory API.

Patients search for medications across the municipality's health units
(UBS), see real availability net of active reservations, and reserve a
quantity for pickup. Pharmacy staff maintain the lot-level stock ledger and
record withdrawals at the counter.

Caller identity is taken from the `X-User-ID` header; identity management
lives upstream of this service.
"#
    ),
    tags(
        (name = "medications", description = "Catalog and availability search"),
        (name = "health-units", description = "UBS directory"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "stock", description = "Lot-level stock ledger"),
        (name = "withdrawals", description = "Counter dispensation records")
    ),
    paths(
        crate::handlers::medications::list_medications,
        crate::handlers::medications::create_medication,
        crate::handlers::medications::update_medication,
        crate::handlers::medications::set_medication_active,
        crate::handlers::medications::search_medications,
        crate::handlers::medications::get_availability,
        crate::handlers::health_units::list_health_units,
        crate::handlers::health_units::get_health_unit,
        crate::handlers::health_units::create_health_unit,
        crate::handlers::health_units::update_health_unit,
        crate::handlers::health_units::set_health_unit_active,
        crate::handlers::reservations::create_reservation,
        crate::handlers::reservations::cancel_reservation,
        crate::handlers::reservations::reschedule_reservation,
        crate::handlers::reservations::list_my_reservations,
        crate::handlers::stock::list_stock,
        crate::handlers::stock::create_stock_lot,
        crate::handlers::stock::check_lot,
        crate::handlers::stock::update_stock_lot,
        crate::handlers::stock::delete_stock_lot,
        crate::handlers::withdrawals::record_withdrawal,
        crate::handlers::withdrawals::list_my_withdrawals,
    ),
    components(
        schemas(
            crate::services::catalog::MedicationInput,
            crate::services::catalog::SearchResult,
            crate::services::health_units::HealthUnitInput,
            crate::services::reservations::ReservationReceipt,
            crate::services::reservations::ReservationRow,
            crate::services::stock::CreateStockLotCommand,
            crate::services::stock::UpdateStockLotCommand,
            crate::services::stock::CheckLotQuery,
            crate::services::stock::StockLotRow,
            crate::services::withdrawals::WithdrawalItemInput,
            crate::services::withdrawals::WithdrawalRecord,
            crate::services::withdrawals::WithdrawalItemLine,
            crate::services::withdrawals::WithdrawalHistoryRow,
            crate::handlers::medications::SetActiveRequest,
            crate::handlers::reservations::CreateReservationRequest,
            crate::handlers::reservations::RescheduleRequest,
            crate::handlers::withdrawals::RecordWithdrawalRequest,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDocV1::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/reservations"));
        assert!(doc.paths.paths.contains_key("/api/v1/medications/search"));
    }
}
