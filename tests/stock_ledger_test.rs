mod common;

use common::{days_from_today, TestCtx};
use medcontrol_api::errors::ServiceError;
use medcontrol_api::services::stock::{
    CheckLotQuery, CreateStockLotCommand, UpdateStockLotCommand,
};

#[tokio::test]
async fn duplicate_lot_code_for_the_same_pair_conflicts() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Dipyrone 500", "dipyrone").await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;

    let cmd = CreateStockLotCommand {
        medication_id: med,
        ubs_id: ubs,
        lot_code: "L-2026-01".into(),
        quantity: 40,
        expiry_date: days_from_today(365),
    };
    ctx.stock.create_stock_lot(Some(1), cmd.clone()).await.unwrap();

    let err = ctx.stock.create_stock_lot(Some(1), cmd).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The same code at another UBS is a different lot.
    let other_ubs = ctx.seed_health_unit("UBS Norte").await;
    ctx.stock
        .create_stock_lot(
            Some(1),
            CreateStockLotCommand {
                medication_id: med,
                ubs_id: other_ubs,
                lot_code: "L-2026-01".into(),
                quantity: 10,
                expiry_date: days_from_today(365),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn check_lot_reports_existence() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Amoxicillin 500", "amoxicillin").await;
    let ubs = ctx.seed_health_unit("UBS Sul").await;
    ctx.seed_lot(med, ubs, "AMX-7", 12, 200).await;

    let exists = ctx
        .stock
        .lot_exists(CheckLotQuery {
            medication_id: med,
            ubs_id: ubs,
            lot_code: "AMX-7".into(),
        })
        .await
        .unwrap();
    assert!(exists);

    let exists = ctx
        .stock
        .lot_exists(CheckLotQuery {
            medication_id: med,
            ubs_id: ubs,
            lot_code: "AMX-8".into(),
        })
        .await
        .unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn update_and_delete_manage_the_ledger() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Losartan 50", "losartan").await;
    let ubs = ctx.seed_health_unit("UBS Leste").await;
    let lot = ctx.seed_lot(med, ubs, "LOS-1", 30, 90).await;

    let updated = ctx
        .stock
        .update_stock_lot(
            Some(1),
            lot,
            UpdateStockLotCommand {
                quantity: 25,
                expiry_date: days_from_today(60),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity, 25);

    ctx.stock.delete_stock_lot(Some(1), lot).await.unwrap();
    let err = ctx.stock.delete_stock_lot(Some(1), lot).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn ledger_listing_is_scoped_to_one_ubs() {
    let ctx = TestCtx::new().await;
    let med = ctx.seed_medication("Metformin 850", "metformin").await;
    let ubs_a = ctx.seed_health_unit("UBS Aurora").await;
    let ubs_b = ctx.seed_health_unit("UBS Boa Vista").await;
    ctx.seed_lot(med, ubs_a, "M-1", 10, 90).await;
    ctx.seed_lot(med, ubs_a, "M-2", 0, -3).await;
    ctx.seed_lot(med, ubs_b, "M-3", 5, 90).await;

    // Administrators see everything at their unit, expired and empty included.
    let rows = ctx.stock.list_stock(ubs_a).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.ubs_name == "UBS Aurora"));

    let rows = ctx.stock.list_stock(ubs_b).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].lot_code, "M-3");
}
