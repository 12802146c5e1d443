//! Repository for the `rack_inventory` table.
//!
//! Inventory rows are written inside the storage lifecycle transactions
//! (see `storage_repo`); this repository only reads them back.

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::rack_inventory::RackInventory;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, rack_id, shipment_id, quantity, created_at, updated_at";

pub struct RackInventoryRepo;

impl RackInventoryRepo {
    /// List the shipments currently occupying a rack.
    pub async fn list_by_rack(
        pool: &PgPool,
        rack_id: DbId,
    ) -> Result<Vec<RackInventory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rack_inventory
             WHERE rack_id = $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, RackInventory>(&query)
            .bind(rack_id)
            .fetch_all(pool)
            .await
    }

    /// Current quantity for a (rack, shipment) pair, if any.
    pub async fn find_quantity(
        pool: &PgPool,
        rack_id: DbId,
        shipment_id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT quantity FROM rack_inventory WHERE rack_id = $1 AND shipment_id = $2",
        )
        .bind(rack_id)
        .bind(shipment_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }
}
