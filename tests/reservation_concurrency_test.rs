mod common;

use common::{pickup_tomorrow, TestCtx};
use medcontrol_api::config::ReservationGuard;
use medcontrol_api::services::reservations::CreateReservationCommand;

// Two patients race for 30 of 50 units. With the serialized guard the
// per-(medication, ubs) lock forces the second check to see the first
// reservation, so exactly one succeeds.
#[tokio::test]
async fn serialized_guard_admits_only_one_of_two_racing_reservations() {
    let ctx = TestCtx::with_guard(ReservationGuard::Serialized).await;
    let med = ctx.seed_medication("Dipyrone 500", "dipyrone").await;
    let ubs = ctx.seed_health_unit("UBS Centro").await;
    ctx.seed_lot(med, ubs, "L-001", 50, 180).await;

    let mut tasks = Vec::new();
    for user_id in 1..=2 {
        let svc = ctx.reservations.clone();
        tasks.push(tokio::spawn(async move {
            svc.create_reservation(CreateReservationCommand {
                user_id,
                medication_id: med,
                ubs_id: ubs,
                quantity: 30,
                pickup_time: pickup_tomorrow(),
            })
            .await
            .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1, "exactly one of the racing reservations should be admitted");
    assert_eq!(ctx.availability.display_availability(med, ubs).await.unwrap(), 20);
}

#[tokio::test]
async fn serialized_guard_admits_sequential_reservations_up_to_stock() {
    let ctx = TestCtx::with_guard(ReservationGuard::Serialized).await;
    let med = ctx.seed_medication("Amoxicillin 500", "amoxicillin").await;
    let ubs = ctx.seed_health_unit("UBS Norte").await;
    ctx.seed_lot(med, ubs, "L-001", 10, 180).await;

    let mut tasks = Vec::new();
    for user_id in 1..=20 {
        let svc = ctx.reservations.clone();
        tasks.push(tokio::spawn(async move {
            svc.create_reservation(CreateReservationCommand {
                user_id,
                medication_id: med,
                ubs_id: ubs,
                quantity: 1,
                pickup_time: pickup_tomorrow(),
            })
            .await
            .is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 10, "only as many single-unit reservations as stock");
    assert_eq!(ctx.availability.display_availability(med, ubs).await.unwrap(), 0);
}

// The guard is scoped per (medication, ubs) pair: a race on one pair must not
// serialize or starve reservations on another.
#[tokio::test]
async fn guard_is_scoped_per_medication_ubs_pair() {
    let ctx = TestCtx::with_guard(ReservationGuard::Serialized).await;
    let med_a = ctx.seed_medication("Losartan 50", "losartan").await;
    let med_b = ctx.seed_medication("Metformin 850", "metformin").await;
    let ubs = ctx.seed_health_unit("UBS Sul").await;
    ctx.seed_lot(med_a, ubs, "A-1", 5, 180).await;
    ctx.seed_lot(med_b, ubs, "B-1", 5, 180).await;

    let mut tasks = Vec::new();
    for med in [med_a, med_b] {
        let svc = ctx.reservations.clone();
        tasks.push(tokio::spawn(async move {
            svc.create_reservation(CreateReservationCommand {
                user_id: 1,
                medication_id: med,
                ubs_id: ubs,
                quantity: 5,
                pickup_time: pickup_tomorrow(),
            })
            .await
            .is_ok()
        }));
    }

    for task in tasks {
        assert!(task.await.unwrap());
    }
}
