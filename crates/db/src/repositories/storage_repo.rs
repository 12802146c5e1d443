//! The storage lifecycle operations: provision, assign, release, and the
//! capacity reconciliation they all share.
//!
//! Every capacity-affecting operation runs in a single transaction that
//! locks the rack row(s) with `SELECT ... FOR UPDATE` before touching boxes,
//! then recomputes pallet usage over the rack's stored boxes and persists it.
//! The `racks.capacity_used` column is therefore a cache rewritten under the
//! lock on every mutation, never an independently drifting counter. Two
//! concurrent operations on the same rack serialize on the row lock; a
//! release spanning several racks locks them in ascending id order.

use std::collections::BTreeMap;

use sqlx::{PgConnection, PgPool};
use stowage_core::pallet::{pallet_usage, BoxView};
use stowage_core::types::DbId;

use crate::models::rack_activity::{ACTIVITY_ASSIGN, ACTIVITY_RELEASE};
use crate::models::shipment::Shipment;
use crate::models::shipment_box::StoredBoxRow;
use crate::models::status::{BoxStatus, RackStatus, ShipmentStatus, StatusId};
use crate::models::storage::{
    AssignBoxes, AssignOutcome, AssignResult, ProvisionResult, ProvisionShipment, RackRelease,
    ReleaseBoxes, ReleaseOutcome, ReleaseResult,
};
use crate::repositories::shipment_repo;

/// Storage lifecycle operations spanning shipments, boxes, racks, inventory,
/// and the activity log.
pub struct StorageRepo;

impl StorageRepo {
    // ── Reconciliation ───────────────────────────────────────────────

    /// Recompute a rack's pallet usage from the boxes currently stored on
    /// it, scoped to the company. Read-only: this is the authoritative path
    /// used whenever a rack view is served.
    pub async fn recompute_rack_usage(
        pool: &PgPool,
        company_id: DbId,
        rack_id: DbId,
    ) -> Result<i32, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        current_pallet_usage(&mut *conn, company_id, rack_id).await
    }

    // ── Provisioning ─────────────────────────────────────────────────

    /// Create a shipment and its numbered boxes in one transaction,
    /// optionally assigning every box to a rack at intake.
    ///
    /// With an intake rack: boxes are created `Stored` on it, the rack's
    /// usage is recomputed and persisted, an inventory row is written, and
    /// an `assign` activity entry is appended. Any failure rolls the whole
    /// intake back.
    pub async fn provision_shipment(
        pool: &PgPool,
        input: &ProvisionShipment,
    ) -> Result<ProvisionResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(rack_id) = input.rack_id {
            if !lock_rack(&mut *tx, input.company_id, rack_id).await? {
                return Ok(ProvisionResult::RackNotFound);
            }
        }

        let status = if input.rack_id.is_some() {
            ShipmentStatus::InStorage
        } else {
            ShipmentStatus::Pending
        };
        let query = format!(
            "INSERT INTO shipments
                (company_id, reference_code, client_id, client_name, client_email,
                 client_phone, shipment_type, original_box_count, current_box_count,
                 pallet_count, boxes_per_pallet, estimated_value, master_qr, status_id,
                 assigned_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10, $11, $12, $13,
                     CASE WHEN $14 THEN NOW() END)
             RETURNING {}",
            shipment_repo::COLUMNS
        );
        let shipment = sqlx::query_as::<_, Shipment>(&query)
            .bind(input.company_id)
            .bind(&input.reference_code)
            .bind(input.client_id)
            .bind(&input.client_name)
            .bind(&input.client_email)
            .bind(&input.client_phone)
            .bind(&input.shipment_type)
            .bind(input.total_boxes)
            .bind(input.pallet_count)
            .bind(input.boxes_per_pallet)
            .bind(input.estimated_value)
            .bind(&input.master_qr)
            .bind(status.id())
            .bind(input.rack_id.is_some())
            .fetch_one(&mut *tx)
            .await?;

        let box_numbers: Vec<i32> = (1..=input.total_boxes).collect();
        let box_status = if input.rack_id.is_some() {
            BoxStatus::Stored
        } else {
            BoxStatus::Pending
        };
        sqlx::query(
            "INSERT INTO shipment_boxes
                (shipment_id, box_number, piece_code, status_id, rack_id, assigned_at)
             SELECT $1, t.box_number, t.piece_code, $2, $3,
                    CASE WHEN $3::BIGINT IS NULL THEN NULL ELSE NOW() END
             FROM UNNEST($4::INT[], $5::TEXT[]) AS t (box_number, piece_code)",
        )
        .bind(shipment.id)
        .bind(box_status.id())
        .bind(input.rack_id)
        .bind(&box_numbers)
        .bind(&input.box_codes)
        .execute(&mut *tx)
        .await?;

        if let Some(rack_id) = input.rack_id {
            let usage = current_pallet_usage(&mut *tx, input.company_id, rack_id).await?;
            persist_rack_usage(&mut *tx, rack_id, usage).await?;
            adjust_inventory(&mut *tx, rack_id, shipment.id, input.total_boxes).await?;
            append_activity(
                &mut *tx,
                rack_id,
                input.user_id,
                ACTIVITY_ASSIGN,
                &format!(
                    "Shipment {} intake: {} boxes stored",
                    shipment.reference_code, input.total_boxes
                ),
                input.total_boxes,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(ProvisionResult::Created(shipment))
    }

    // ── Assignment ───────────────────────────────────────────────────

    /// Assign a batch of a shipment's pending boxes to a rack.
    ///
    /// Box numbers that do not belong to the shipment, are already stored,
    /// or are released are silently excluded from the update set. Flips the
    /// shipment to `InStorage` once every box sits on a rack.
    pub async fn assign_boxes(
        pool: &PgPool,
        input: &AssignBoxes,
    ) -> Result<AssignResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(shipment) = lock_shipment(&mut *tx, input.company_id, input.shipment_id).await?
        else {
            return Ok(AssignResult::ShipmentNotFound);
        };
        if !lock_rack(&mut *tx, input.company_id, input.rack_id).await? {
            return Ok(AssignResult::RackNotFound);
        }

        let assigned: Vec<(DbId,)> = sqlx::query_as(
            "UPDATE shipment_boxes
             SET rack_id = $1, status_id = $2, assigned_at = NOW()
             WHERE shipment_id = $3 AND box_number = ANY($4) AND status_id = $5
             RETURNING id",
        )
        .bind(input.rack_id)
        .bind(BoxStatus::InStorage.id())
        .bind(input.shipment_id)
        .bind(&input.box_numbers)
        .bind(BoxStatus::Pending.id())
        .fetch_all(&mut *tx)
        .await?;
        let assigned_count = assigned.len() as i32;

        let mut shipment_status_id = shipment.status_id;
        let rack_capacity_used;

        if assigned_count > 0 {
            let usage = current_pallet_usage(&mut *tx, input.company_id, input.rack_id).await?;
            persist_rack_usage(&mut *tx, input.rack_id, usage).await?;
            adjust_inventory(&mut *tx, input.rack_id, input.shipment_id, assigned_count).await?;
            rack_capacity_used = usage;

            // Full-storage detection: every box now sits on a rack.
            let unplaced: (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM shipment_boxes WHERE shipment_id = $1 AND rack_id IS NULL",
            )
            .bind(input.shipment_id)
            .fetch_one(&mut *tx)
            .await?;
            if unplaced.0 == 0 {
                sqlx::query(
                    "UPDATE shipments
                     SET status_id = $2, assigned_at = COALESCE(assigned_at, NOW())
                     WHERE id = $1",
                )
                .bind(input.shipment_id)
                .bind(ShipmentStatus::InStorage.id())
                .execute(&mut *tx)
                .await?;
                shipment_status_id = ShipmentStatus::InStorage.id();
            }

            append_activity(
                &mut *tx,
                input.rack_id,
                input.user_id,
                ACTIVITY_ASSIGN,
                &format!(
                    "Assigned {} boxes of shipment {} ({} photos)",
                    assigned_count, shipment.reference_code, input.photo_count
                ),
                assigned_count,
            )
            .await?;
        } else {
            // Nothing matched; leave the rack untouched.
            let row: (i32,) = sqlx::query_as("SELECT capacity_used FROM racks WHERE id = $1")
                .bind(input.rack_id)
                .fetch_one(&mut *tx)
                .await?;
            rack_capacity_used = row.0;
        }

        tx.commit().await?;
        Ok(AssignResult::Assigned(AssignOutcome {
            assigned_count,
            shipment_status_id,
            rack_capacity_used,
        }))
    }

    // ── Release ──────────────────────────────────────────────────────

    /// Release a batch of a shipment's stored boxes, or all of them.
    ///
    /// The release set is the intersection of the request with the boxes
    /// currently stored, so re-releasing an already released box is a
    /// no-op rather than a double decrement. Racks are locked in ascending
    /// id order; each affected rack gets its usage recomputed, its
    /// inventory adjusted, and one `release` activity entry -- all inside
    /// the one transaction.
    pub async fn release_boxes(
        pool: &PgPool,
        input: &ReleaseBoxes,
    ) -> Result<ReleaseResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(shipment) = lock_shipment(&mut *tx, input.company_id, input.shipment_id).await?
        else {
            return Ok(ReleaseResult::ShipmentNotFound);
        };

        // Resolve the release set from the boxes currently stored.
        let stored: Vec<(DbId, i32, Option<DbId>)> = match &input.box_numbers {
            Some(numbers) => {
                sqlx::query_as(
                    "SELECT id, box_number, rack_id FROM shipment_boxes
                     WHERE shipment_id = $1 AND status_id IN ($2, $3) AND box_number = ANY($4)",
                )
                .bind(input.shipment_id)
                .bind(BoxStatus::InStorage.id())
                .bind(BoxStatus::Stored.id())
                .bind(numbers)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, box_number, rack_id FROM shipment_boxes
                     WHERE shipment_id = $1 AND status_id IN ($2, $3)",
                )
                .bind(input.shipment_id)
                .bind(BoxStatus::InStorage.id())
                .bind(BoxStatus::Stored.id())
                .fetch_all(&mut *tx)
                .await?
            }
        };
        if stored.is_empty() {
            return Ok(ReleaseResult::NothingToRelease);
        }

        // Group by owning rack. BTreeMap gives ascending-id lock order.
        let mut by_rack: BTreeMap<DbId, Vec<DbId>> = BTreeMap::new();
        let mut all_ids: Vec<DbId> = Vec::with_capacity(stored.len());
        for (box_id, _, rack_id) in &stored {
            all_ids.push(*box_id);
            if let Some(rack_id) = rack_id {
                by_rack.entry(*rack_id).or_default().push(*box_id);
            }
        }

        for rack_id in by_rack.keys() {
            sqlx::query("SELECT id FROM racks WHERE id = $1 FOR UPDATE")
                .bind(rack_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "UPDATE shipment_boxes
             SET status_id = $2, released_at = NOW(), rack_id = NULL
             WHERE id = ANY($1)",
        )
        .bind(&all_ids)
        .bind(BoxStatus::Released.id())
        .execute(&mut *tx)
        .await?;

        let mut racks = Vec::with_capacity(by_rack.len());
        for (rack_id, box_ids) in &by_rack {
            let released_count = box_ids.len() as i32;
            let usage = current_pallet_usage(&mut *tx, input.company_id, *rack_id).await?;
            persist_rack_usage(&mut *tx, *rack_id, usage).await?;
            adjust_inventory(&mut *tx, *rack_id, input.shipment_id, -released_count).await?;
            append_activity(
                &mut *tx,
                *rack_id,
                input.user_id,
                ACTIVITY_RELEASE,
                &format!(
                    "Released {} boxes of shipment {} ({} photos)",
                    released_count, shipment.reference_code, input.photo_count
                ),
                released_count,
            )
            .await?;
            racks.push(RackRelease {
                rack_id: *rack_id,
                released_count,
                capacity_used: usage,
            });
        }

        // Shipment status from what remains in storage.
        let remaining: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shipment_boxes \
             WHERE shipment_id = $1 AND status_id IN ($2, $3)",
        )
        .bind(input.shipment_id)
        .bind(BoxStatus::InStorage.id())
        .bind(BoxStatus::Stored.id())
        .fetch_one(&mut *tx)
        .await?;
        let not_released: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shipment_boxes WHERE shipment_id = $1 AND status_id <> $2",
        )
        .bind(input.shipment_id)
        .bind(BoxStatus::Released.id())
        .fetch_one(&mut *tx)
        .await?;

        let full_release = remaining.0 == 0;
        let status = if full_release {
            ShipmentStatus::Released
        } else {
            ShipmentStatus::Partial
        };
        sqlx::query(
            "UPDATE shipments
             SET status_id = $2, current_box_count = $3,
                 released_at = CASE WHEN $4 THEN NOW() ELSE released_at END
             WHERE id = $1",
        )
        .bind(input.shipment_id)
        .bind(status.id())
        .bind(not_released.0 as i32)
        .bind(full_release)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ReleaseResult::Released(ReleaseOutcome {
            released_count: stored.len() as i32,
            remaining_count: remaining.0 as i32,
            shipment_status_id: status.id(),
            racks,
        }))
    }
}

// ---------------------------------------------------------------------------
// Transaction-scoped helpers
// ---------------------------------------------------------------------------

/// Lock a rack row within the company. Returns `false` if it does not exist.
async fn lock_rack(
    conn: &mut PgConnection,
    company_id: DbId,
    rack_id: DbId,
) -> Result<bool, sqlx::Error> {
    let row: Option<(DbId,)> =
        sqlx::query_as("SELECT id FROM racks WHERE id = $1 AND company_id = $2 FOR UPDATE")
            .bind(rack_id)
            .bind(company_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.is_some())
}

/// Lock a shipment row within the company, returning it.
async fn lock_shipment(
    conn: &mut PgConnection,
    company_id: DbId,
    shipment_id: DbId,
) -> Result<Option<Shipment>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM shipments WHERE id = $1 AND company_id = $2 FOR UPDATE",
        shipment_repo::COLUMNS
    );
    sqlx::query_as::<_, Shipment>(&query)
        .bind(shipment_id)
        .bind(company_id)
        .fetch_optional(conn)
        .await
}

/// Pallet usage over the boxes currently stored on a rack.
async fn current_pallet_usage(
    conn: &mut PgConnection,
    company_id: DbId,
    rack_id: DbId,
) -> Result<i32, sqlx::Error> {
    let rows: Vec<StoredBoxRow> = sqlx::query_as(
        "SELECT b.shipment_id, s.boxes_per_pallet, b.box_number, b.piece_meta
         FROM shipment_boxes b
         JOIN shipments s ON b.shipment_id = s.id
         WHERE b.rack_id = $1 AND s.company_id = $2 AND b.status_id IN ($3, $4)",
    )
    .bind(rack_id)
    .bind(company_id)
    .bind(BoxStatus::InStorage.id())
    .bind(BoxStatus::Stored.id())
    .fetch_all(conn)
    .await?;

    let views: Vec<BoxView> = rows.iter().map(StoredBoxRow::to_view).collect();
    Ok(pallet_usage(&views))
}

/// Persist recomputed usage and the status it implies, stamping last_activity_at.
async fn persist_rack_usage(
    conn: &mut PgConnection,
    rack_id: DbId,
    usage: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE racks
         SET capacity_used = $2,
             status_id = CASE WHEN $2 >= capacity_total THEN $3 ELSE $4 END,
             last_activity_at = NOW()
         WHERE id = $1",
    )
    .bind(rack_id)
    .bind(usage)
    .bind(StatusId::from(RackStatus::Full))
    .bind(StatusId::from(RackStatus::Active))
    .execute(conn)
    .await?;
    Ok(())
}

/// Add `delta` boxes of a shipment to a rack's inventory row (negative to
/// remove), creating it on first assignment and dropping it at zero.
async fn adjust_inventory(
    conn: &mut PgConnection,
    rack_id: DbId,
    shipment_id: DbId,
    delta: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO rack_inventory (rack_id, shipment_id, quantity)
         VALUES ($1, $2, GREATEST($3, 0))
         ON CONFLICT ON CONSTRAINT uq_rack_inventory_rack_shipment
         DO UPDATE SET quantity = rack_inventory.quantity + $3",
    )
    .bind(rack_id)
    .bind(shipment_id)
    .bind(delta)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "DELETE FROM rack_inventory WHERE rack_id = $1 AND shipment_id = $2 AND quantity <= 0",
    )
    .bind(rack_id)
    .bind(shipment_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Append an activity entry within the operation's transaction.
async fn append_activity(
    conn: &mut PgConnection,
    rack_id: DbId,
    user_id: DbId,
    activity_type: &str,
    detail: &str,
    quantity: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO rack_activity (rack_id, user_id, activity_type, detail, quantity)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(rack_id)
    .bind(user_id)
    .bind(activity_type)
    .bind(detail)
    .bind(quantity)
    .execute(conn)
    .await?;
    Ok(())
}
