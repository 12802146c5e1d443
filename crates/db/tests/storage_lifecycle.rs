//! Integration tests for the storage lifecycle operations.
//!
//! Exercises the transactional provision / assign / release paths against a
//! real database:
//! - the intake -> assignment -> partial release walkthrough
//! - capacity conservation (persisted counter vs recomputed pallet usage)
//! - idempotent re-release of already released boxes
//! - shipment status transitions
//! - immediate-rack provisioning and its rollback on a missing rack
//! - cross-rack release bookkeeping

use assert_matches::assert_matches;
use sqlx::PgPool;
use stowage_db::models::rack::CreateRack;
use stowage_db::models::rack_activity::{ACTIVITY_ASSIGN, ACTIVITY_RELEASE};
use stowage_db::models::status::{BoxStatus, RackStatus, ShipmentStatus};
use stowage_db::models::storage::{
    AssignBoxes, AssignResult, ProvisionResult, ProvisionShipment, ReleaseBoxes, ReleaseResult,
};
use stowage_db::repositories::{
    RackActivityRepo, RackInventoryRepo, RackRepo, ShipmentBoxRepo, ShipmentRepo, StorageRepo,
};

const COMPANY: i64 = 1;
const USER: i64 = 42;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn provision_input(
    reference: &str,
    total_boxes: i32,
    boxes_per_pallet: Option<i32>,
    rack_id: Option<i64>,
) -> ProvisionShipment {
    let master_qr = format!("TEST-{reference}-{total_boxes}");
    ProvisionShipment {
        company_id: COMPANY,
        user_id: USER,
        reference_code: reference.to_string(),
        client_id: None,
        client_name: Some("Test Client".to_string()),
        client_email: None,
        client_phone: Some("+15550100".to_string()),
        shipment_type: "personal".to_string(),
        total_boxes,
        pallet_count: None,
        boxes_per_pallet,
        estimated_value: None,
        box_codes: (1..=total_boxes)
            .map(|n| format!("{master_qr}-BX{n}/{total_boxes}"))
            .collect(),
        master_qr,
        rack_id,
    }
}

async fn new_rack(pool: &PgPool, code: &str, capacity_total: i32) -> i64 {
    RackRepo::create(
        pool,
        COMPANY,
        &CreateRack {
            code: code.to_string(),
            rack_type: None,
            capacity_total,
            notes: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn provision(
    pool: &PgPool,
    reference: &str,
    total_boxes: i32,
    boxes_per_pallet: Option<i32>,
    rack_id: Option<i64>,
) -> i64 {
    match StorageRepo::provision_shipment(
        pool,
        &provision_input(reference, total_boxes, boxes_per_pallet, rack_id),
    )
    .await
    .unwrap()
    {
        ProvisionResult::Created(shipment) => shipment.id,
        ProvisionResult::RackNotFound => panic!("intake rack should exist"),
    }
}

async fn assign(pool: &PgPool, shipment_id: i64, rack_id: i64, box_numbers: Vec<i32>) {
    let result = StorageRepo::assign_boxes(
        pool,
        &AssignBoxes {
            company_id: COMPANY,
            user_id: USER,
            shipment_id,
            rack_id,
            box_numbers,
            photo_count: 0,
        },
    )
    .await
    .unwrap();
    assert_matches!(result, AssignResult::Assigned(_));
}

async fn release(
    pool: &PgPool,
    shipment_id: i64,
    box_numbers: Option<Vec<i32>>,
) -> stowage_db::models::storage::ReleaseOutcome {
    match StorageRepo::release_boxes(
        pool,
        &ReleaseBoxes {
            company_id: COMPANY,
            user_id: USER,
            shipment_id,
            box_numbers,
            photo_count: 0,
        },
    )
    .await
    .unwrap()
    {
        ReleaseResult::Released(outcome) => outcome,
        other => panic!("expected a successful release, got {other:?}"),
    }
}

async fn rack_capacity_used(pool: &PgPool, rack_id: i64) -> i32 {
    RackRepo::find_by_id(pool, COMPANY, rack_id)
        .await
        .unwrap()
        .unwrap()
        .capacity_used
}

/// Persisted counter and recomputed pallet usage must agree after every
/// capacity-affecting operation.
async fn assert_capacity_conserved(pool: &PgPool, rack_id: i64) {
    let persisted = rack_capacity_used(pool, rack_id).await;
    let recomputed = StorageRepo::recompute_rack_usage(pool, COMPANY, rack_id)
        .await
        .unwrap();
    assert_eq!(
        persisted, recomputed,
        "persisted capacity_used diverged from recomputed pallet usage"
    );
}

// ---------------------------------------------------------------------------
// Intake -> assignment -> partial release walkthrough
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_lifecycle_walkthrough(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "WALK-1", 10, None, None).await;

    // Intake: ten pending boxes, nothing stored anywhere.
    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::Pending.id());
    assert_eq!(row.current_box_count, 10);
    let boxes = ShipmentBoxRepo::list_by_shipment(&pool, shipment).await.unwrap();
    assert_eq!(boxes.len(), 10);
    assert!(boxes
        .iter()
        .all(|b| b.status_id == BoxStatus::Pending.id() && b.rack_id.is_none()));

    // Assign everything; one box per slot without pallet metadata.
    assign(&pool, shipment, rack, (1..=10).collect()).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 10);
    assert_capacity_conserved(&pool, rack).await;

    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::InStorage.id());
    assert!(row.assigned_at.is_some());

    // Partial release of boxes 1-4.
    let outcome = release(&pool, shipment, Some(vec![1, 2, 3, 4])).await;
    assert_eq!(outcome.released_count, 4);
    assert_eq!(outcome.remaining_count, 6);
    assert_eq!(outcome.shipment_status_id, ShipmentStatus::Partial.id());
    assert_eq!(rack_capacity_used(&pool, rack).await, 6);
    assert_capacity_conserved(&pool, rack).await;

    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::Partial.id());
    assert_eq!(row.current_box_count, 6);
    assert!(row.released_at.is_none(), "partial release must not stamp released_at");

    // Released boxes have left the rack; the rest still sit on it.
    let boxes = ShipmentBoxRepo::list_by_shipment(&pool, shipment).await.unwrap();
    for b in &boxes {
        if b.box_number <= 4 {
            assert_eq!(b.status_id, BoxStatus::Released.id());
            assert!(b.rack_id.is_none());
            assert!(b.released_at.is_some());
        } else {
            assert_eq!(b.status_id, BoxStatus::InStorage.id());
            assert_eq!(b.rack_id, Some(rack));
        }
    }

    // One release activity entry with the affected box count.
    let activity = RackActivityRepo::list_by_rack(&pool, rack, 100, 0).await.unwrap();
    let releases: Vec<_> = activity
        .iter()
        .filter(|a| a.activity_type == ACTIVITY_RELEASE)
        .collect();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].quantity, 4);
    assert_eq!(releases[0].user_id, Some(USER));
}

/// Same walkthrough with five boxes per pallet: the persisted counter is
/// pallet slots, not box count.
#[sqlx::test(migrations = "../../db/migrations")]
async fn capacity_counts_pallet_slots_not_boxes(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "PAL-1", 10, Some(5), None).await;

    // Boxes 1-5 on pallet 1, boxes 6-10 on pallet 2.
    assign(&pool, shipment, rack, (1..=10).collect()).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 2);
    assert_capacity_conserved(&pool, rack).await;

    // Releasing boxes 1-4 still leaves box 5 on pallet 1: usage stays 2.
    release(&pool, shipment, Some(vec![1, 2, 3, 4])).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 2);
    assert_capacity_conserved(&pool, rack).await;

    // Releasing box 5 frees pallet 1.
    release(&pool, shipment, Some(vec![5])).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 1);
    assert_capacity_conserved(&pool, rack).await;
}

// ---------------------------------------------------------------------------
// Capacity conservation across a mutation sequence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn capacity_conserved_across_interleaved_operations(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 50).await;
    let a = provision(&pool, "SEQ-A", 6, Some(3), None).await;
    let b = provision(&pool, "SEQ-B", 4, None, None).await;

    assign(&pool, a, rack, vec![1, 2, 3]).await; // pallet 1 of A
    assert_capacity_conserved(&pool, rack).await;

    assign(&pool, b, rack, (1..=4).collect()).await; // four slots of B
    assert_capacity_conserved(&pool, rack).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 5);

    assign(&pool, a, rack, vec![4, 5, 6]).await; // pallet 2 of A
    assert_capacity_conserved(&pool, rack).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 6);

    release(&pool, b, Some(vec![2, 3])).await;
    assert_capacity_conserved(&pool, rack).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 4);

    release(&pool, a, None).await;
    assert_capacity_conserved(&pool, rack).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 2);

    release(&pool, b, None).await;
    assert_capacity_conserved(&pool, rack).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rack_goes_full_and_recovers(pool: PgPool) {
    let rack = new_rack(&pool, "TIGHT", 3).await;
    let shipment = provision(&pool, "FULL-1", 3, None, None).await;

    assign(&pool, shipment, rack, vec![1, 2, 3]).await;
    let row = RackRepo::find_by_id(&pool, COMPANY, rack).await.unwrap().unwrap();
    assert_eq!(row.capacity_used, 3);
    assert_eq!(row.status_id, RackStatus::Full.id());

    release(&pool, shipment, Some(vec![1])).await;
    let row = RackRepo::find_by_id(&pool, COMPANY, rack).await.unwrap().unwrap();
    assert_eq!(row.capacity_used, 2);
    assert_eq!(row.status_id, RackStatus::Active.id());
}

// ---------------------------------------------------------------------------
// Release idempotence and filtering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn re_release_of_released_boxes_is_excluded(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "IDEM-1", 5, None, None).await;
    assign(&pool, shipment, rack, (1..=5).collect()).await;

    release(&pool, shipment, Some(vec![1, 2])).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 3);

    // Boxes 1 and 2 are already released; only box 3 is in the release set.
    let outcome = release(&pool, shipment, Some(vec![1, 2, 3])).await;
    assert_eq!(outcome.released_count, 1);
    assert_eq!(outcome.remaining_count, 2);
    assert_eq!(rack_capacity_used(&pool, rack).await, 2);
    assert_capacity_conserved(&pool, rack).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn releasing_only_released_boxes_is_a_no_op(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "IDEM-2", 3, None, None).await;
    assign(&pool, shipment, rack, (1..=3).collect()).await;
    release(&pool, shipment, Some(vec![1])).await;

    let result = StorageRepo::release_boxes(
        &pool,
        &ReleaseBoxes {
            company_id: COMPANY,
            user_id: USER,
            shipment_id: shipment,
            box_numbers: Some(vec![1]),
            photo_count: 0,
        },
    )
    .await
    .unwrap();
    assert_matches!(result, ReleaseResult::NothingToRelease);

    // No state change: capacity untouched, no extra activity entry.
    assert_eq!(rack_capacity_used(&pool, rack).await, 2);
    let releases = RackActivityRepo::list_by_rack(&pool, rack, 100, 0)
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.activity_type == ACTIVITY_RELEASE)
        .count();
    assert_eq!(releases, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_boxes_are_not_releasable(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "PEND-1", 4, None, None).await;
    assign(&pool, shipment, rack, vec![1, 2]).await;

    // Boxes 3 and 4 were never assigned; only 1 and 2 can be released.
    let outcome = release(&pool, shipment, None).await;
    assert_eq!(outcome.released_count, 2);
    assert_eq!(outcome.remaining_count, 0);
}

// ---------------------------------------------------------------------------
// Shipment status transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn shipment_flips_to_in_storage_only_when_every_box_is_placed(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "TRANS-1", 4, None, None).await;

    assign(&pool, shipment, rack, vec![1, 2, 3]).await;
    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::Pending.id());
    assert!(row.assigned_at.is_none());

    // The fourth box completes storage.
    assign(&pool, shipment, rack, vec![4]).await;
    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::InStorage.id());
    assert!(row.assigned_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_release_stamps_released_at_and_zeroes_count(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "TRANS-2", 3, None, None).await;
    assign(&pool, shipment, rack, (1..=3).collect()).await;

    release(&pool, shipment, Some(vec![1])).await;
    let outcome = release(&pool, shipment, None).await;
    assert_eq!(outcome.shipment_status_id, ShipmentStatus::Released.id());
    assert_eq!(outcome.remaining_count, 0);

    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::Released.id());
    assert_eq!(row.current_box_count, 0);
    assert!(row.released_at.is_some());
    assert_eq!(rack_capacity_used(&pool, rack).await, 0);
}

// ---------------------------------------------------------------------------
// Immediate-rack provisioning
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn intake_with_rack_stores_boxes_and_books_capacity(pool: PgPool) {
    let rack = new_rack(&pool, "DOCK", 20).await;
    let shipment = provision(&pool, "INTAKE-1", 6, Some(3), Some(rack)).await;

    let row = ShipmentRepo::find_by_id(&pool, COMPANY, shipment)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status_id, ShipmentStatus::InStorage.id());
    assert!(row.assigned_at.is_some());

    let boxes = ShipmentBoxRepo::list_by_shipment(&pool, shipment).await.unwrap();
    assert_eq!(boxes.len(), 6);
    assert!(boxes
        .iter()
        .all(|b| b.status_id == BoxStatus::Stored.id()
            && b.rack_id == Some(rack)
            && b.assigned_at.is_some()));

    // Two pallets of three boxes.
    assert_eq!(rack_capacity_used(&pool, rack).await, 2);
    assert_capacity_conserved(&pool, rack).await;

    assert_eq!(
        RackInventoryRepo::find_quantity(&pool, rack, shipment).await.unwrap(),
        Some(6)
    );

    let activity = RackActivityRepo::list_by_rack(&pool, rack, 100, 0).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].activity_type, ACTIVITY_ASSIGN);
    assert_eq!(activity[0].quantity, 6);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn intake_with_missing_rack_rolls_back_everything(pool: PgPool) {
    let result = StorageRepo::provision_shipment(
        &pool,
        &provision_input("ROLLBACK-1", 5, None, Some(9999)),
    )
    .await
    .unwrap();
    assert_matches!(result, ProvisionResult::RackNotFound);

    // No shipment row survived the rollback.
    let shipments = ShipmentRepo::list_by_company(&pool, COMPANY, 100, 0).await.unwrap();
    assert!(shipments.is_empty());
}

// ---------------------------------------------------------------------------
// Cross-rack release
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn release_spanning_racks_updates_each_rack_atomically(pool: PgPool) {
    let rack_a = new_rack(&pool, "A1", 50).await;
    let rack_b = new_rack(&pool, "B1", 50).await;
    let shipment = provision(&pool, "SPAN-1", 6, None, None).await;

    assign(&pool, shipment, rack_a, vec![1, 2, 3, 4]).await;
    assign(&pool, shipment, rack_b, vec![5, 6]).await;

    let outcome = release(&pool, shipment, None).await;
    assert_eq!(outcome.released_count, 6);
    assert_eq!(outcome.racks.len(), 2);

    let by_rack: std::collections::HashMap<i64, i32> = outcome
        .racks
        .iter()
        .map(|r| (r.rack_id, r.released_count))
        .collect();
    assert_eq!(by_rack[&rack_a], 4);
    assert_eq!(by_rack[&rack_b], 2);

    assert_eq!(rack_capacity_used(&pool, rack_a).await, 0);
    assert_eq!(rack_capacity_used(&pool, rack_b).await, 0);

    // One release entry per affected rack.
    for rack in [rack_a, rack_b] {
        let releases = RackActivityRepo::list_by_rack(&pool, rack, 100, 0)
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.activity_type == ACTIVITY_RELEASE)
            .count();
        assert_eq!(releases, 1);
    }
}

// ---------------------------------------------------------------------------
// Inventory sync and company scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn inventory_tracks_assignments_and_releases(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "INV-1", 5, None, None).await;

    assign(&pool, shipment, rack, vec![1, 2, 3]).await;
    assert_eq!(
        RackInventoryRepo::find_quantity(&pool, rack, shipment).await.unwrap(),
        Some(3)
    );

    assign(&pool, shipment, rack, vec![4, 5]).await;
    assert_eq!(
        RackInventoryRepo::find_quantity(&pool, rack, shipment).await.unwrap(),
        Some(5)
    );

    release(&pool, shipment, Some(vec![1, 2])).await;
    assert_eq!(
        RackInventoryRepo::find_quantity(&pool, rack, shipment).await.unwrap(),
        Some(3)
    );

    // Full release drops the inventory row entirely.
    release(&pool, shipment, None).await;
    assert_eq!(
        RackInventoryRepo::find_quantity(&pool, rack, shipment).await.unwrap(),
        None
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn operations_are_scoped_to_the_company(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "SCOPE-1", 3, None, None).await;
    assign(&pool, shipment, rack, (1..=3).collect()).await;

    // Another company sees neither the rack nor the shipment.
    let other = 2;
    assert!(RackRepo::find_by_id(&pool, other, rack).await.unwrap().is_none());
    assert!(ShipmentRepo::find_by_id(&pool, other, shipment)
        .await
        .unwrap()
        .is_none());

    let result = StorageRepo::assign_boxes(
        &pool,
        &AssignBoxes {
            company_id: other,
            user_id: USER,
            shipment_id: shipment,
            rack_id: rack,
            box_numbers: vec![1],
            photo_count: 0,
        },
    )
    .await
    .unwrap();
    assert_matches!(result, AssignResult::ShipmentNotFound);

    let result = StorageRepo::release_boxes(
        &pool,
        &ReleaseBoxes {
            company_id: other,
            user_id: USER,
            shipment_id: shipment,
            box_numbers: None,
            photo_count: 0,
        },
    )
    .await
    .unwrap();
    assert_matches!(result, ReleaseResult::ShipmentNotFound);
}

// ---------------------------------------------------------------------------
// Piece metadata in the stored-box projection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn explicit_pallet_and_loose_metadata_shape_recomputed_usage(pool: PgPool) {
    let rack = new_rack(&pool, "R1", 100).await;
    let shipment = provision(&pool, "META-1", 4, None, None).await;
    assign(&pool, shipment, rack, (1..=4).collect()).await;
    assert_eq!(rack_capacity_used(&pool, rack).await, 4);

    // Pin boxes 1 and 2 to the same explicit pallet, mark box 3 loose.
    sqlx::query(
        "UPDATE shipment_boxes SET piece_meta = '{\"pallet\": 7}'::jsonb \
         WHERE shipment_id = $1 AND box_number IN (1, 2)",
    )
    .bind(shipment)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "UPDATE shipment_boxes SET piece_meta = '{\"loose\": true}'::jsonb \
         WHERE shipment_id = $1 AND box_number = 3",
    )
    .bind(shipment)
    .execute(&pool)
    .await
    .unwrap();

    // Pallet 7 (boxes 1+2) + box 4's own slot; the loose box counts nothing.
    let usage = StorageRepo::recompute_rack_usage(&pool, COMPANY, rack)
        .await
        .unwrap();
    assert_eq!(usage, 2);
}
