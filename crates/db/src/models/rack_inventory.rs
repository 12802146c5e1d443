//! Rack inventory model: which shipments occupy a rack, and with how many
//! boxes. A denormalized view maintained inside the same transactions that
//! move boxes.

use serde::Serialize;
use sqlx::FromRow;
use stowage_core::types::{DbId, Timestamp};

/// A row from the `rack_inventory` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RackInventory {
    pub id: DbId,
    pub rack_id: DbId,
    pub shipment_id: DbId,
    pub quantity: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
