//! Repository for the `shipment_boxes` table (reads).
//!
//! Box mutation happens exclusively inside the storage lifecycle
//! transactions in `storage_repo`.

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::shipment_box::ShipmentBox;
use crate::models::status::BoxStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, shipment_id, box_number, piece_code, piece_meta, status_id, \
    rack_id, assigned_at, released_at, created_at, updated_at";

pub struct ShipmentBoxRepo;

impl ShipmentBoxRepo {
    /// List a shipment's boxes in box-number order.
    pub async fn list_by_shipment(
        pool: &PgPool,
        shipment_id: DbId,
    ) -> Result<Vec<ShipmentBox>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shipment_boxes
             WHERE shipment_id = $1
             ORDER BY box_number ASC"
        );
        sqlx::query_as::<_, ShipmentBox>(&query)
            .bind(shipment_id)
            .fetch_all(pool)
            .await
    }

    /// List the boxes currently stored on a rack, scoped to a company.
    pub async fn list_stored_on_rack(
        pool: &PgPool,
        company_id: DbId,
        rack_id: DbId,
    ) -> Result<Vec<ShipmentBox>, sqlx::Error> {
        let query = "SELECT b.id, b.shipment_id, b.box_number, b.piece_code, b.piece_meta, \
             b.status_id, b.rack_id, b.assigned_at, b.released_at, b.created_at, b.updated_at \
             FROM shipment_boxes b \
             JOIN shipments s ON b.shipment_id = s.id \
             WHERE b.rack_id = $1 AND s.company_id = $2 AND b.status_id IN ($3, $4) \
             ORDER BY b.shipment_id ASC, b.box_number ASC";
        sqlx::query_as::<_, ShipmentBox>(query)
            .bind(rack_id)
            .bind(company_id)
            .bind(BoxStatus::InStorage.id())
            .bind(BoxStatus::Stored.id())
            .fetch_all(pool)
            .await
    }

    /// Count a shipment's boxes currently stored on any rack.
    pub async fn count_stored(pool: &PgPool, shipment_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shipment_boxes \
             WHERE shipment_id = $1 AND status_id IN ($2, $3)",
        )
        .bind(shipment_id)
        .bind(BoxStatus::InStorage.id())
        .bind(BoxStatus::Stored.id())
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}
