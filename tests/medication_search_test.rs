mod common;

use common::{pickup_tomorrow, TestCtx};
use medcontrol_api::errors::ServiceError;
use medcontrol_api::services::reservations::CreateReservationCommand;

#[tokio::test]
async fn search_matches_name_and_ingredient_case_insensitively() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Novalgina", "dipyrone").await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;
    ctx.seed_lot(med, ubs, "L-001", 25, 180).await;

    for term in ["noval", "NOVALGINA", "Dipy", "dipyrone"] {
        let results = ctx.catalog.search_medications(term, None).await.unwrap();
        assert_eq!(results.len(), 1, "term {:?} should match", term);
        assert_eq!(results[0].available_quantity, 25);
        assert_eq!(results[0].ubs_name, "UBS Centro");
    }

    let results = ctx.catalog.search_medications("paracetamol", None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_availability_is_net_of_active_reservations() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Amoxil", "amoxicillin").await;
    let ubs_a = ctx.seed_health_unit("UBS Aurora").await;
    let ubs_b = ctx.seed_health_unit("UBS Boa Vista").await;
    ctx.seed_lot(med, ubs_a, "A-1", 20, 180).await;
    ctx.seed_lot(med, ubs_b, "B-1", 10, 180).await;

    ctx.reservations
        .create_reservation(CreateReservationCommand {
            user_id: 1,
            medication_id: med,
            ubs_id: ubs_a,
            quantity: 15,
            pickup_time: pickup_tomorrow(),
        })
        .await
        .unwrap();

    let results = ctx.catalog.search_medications("amoxil", None).await.unwrap();
    assert_eq!(results.len(), 2);

    // Ordered by UBS name.
    assert_eq!(results[0].ubs_name, "UBS Aurora");
    assert_eq!(results[0].available_quantity, 5);
    assert_eq!(results[1].ubs_name, "UBS Boa Vista");
    assert_eq!(results[1].available_quantity, 10);
}

#[tokio::test]
async fn fully_reserved_pairs_drop_out_of_results() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Glifage", "metformin").await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;
    ctx.seed_lot(med, ubs, "L-001", 10, 180).await;

    ctx.reservations
        .create_reservation(CreateReservationCommand {
            user_id: 1,
            medication_id: med,
            ubs_id: ubs,
            quantity: 10,
            pickup_time: pickup_tomorrow(),
        })
        .await
        .unwrap();

    let results = ctx.catalog.search_medications("glifage", None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn expired_lots_and_inactive_records_are_excluded() {
    let ctx = TestCtx::new().await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;

    // Only expired stock.
    let expired_med = ctx.seed_medication("Keflex", "cephalexin").await;
    ctx.seed_lot(expired_med, ubs, "K-1", 30, -5).await;
    let results = ctx.catalog.search_medications("keflex", None).await.unwrap();
    assert!(results.is_empty());

    // Deactivated medication with good stock.
    let med = ctx.seed_medication("Aradois", "losartan").await;
    ctx.seed_lot(med, ubs, "A-1", 30, 180).await;
    ctx.catalog.set_medication_active(None, med, false).await.unwrap();
    let results = ctx.catalog.search_medications("aradois", None).await.unwrap();
    assert!(results.is_empty());

    // Deactivated UBS with good stock.
    let other_med = ctx.seed_medication("Puran T4", "levothyroxine").await;
    let closed_ubs = ctx.seed_health_unit("UBS Desativada").await;
    ctx.seed_lot(other_med, closed_ubs, "P-1", 30, 180).await;
    ctx.health_units
        .set_unit_active(None, closed_ubs, false)
        .await
        .unwrap();
    let results = ctx.catalog.search_medications("puran", None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn blank_search_term_is_rejected() {
    let ctx = TestCtx::new().await;

    for term in ["", "   "] {
        let err = ctx.catalog.search_medications(term, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
