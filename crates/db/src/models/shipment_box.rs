//! Shipment box entity model.
//!
//! Boxes are created in a batch at intake and never deleted individually;
//! they leave the system only when their shipment is deleted.

use serde::Serialize;
use sqlx::FromRow;
use stowage_core::pallet::{BoxView, PieceMeta};
use stowage_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `shipment_boxes` table.
///
/// `rack_id` is non-null exactly while the box is physically stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShipmentBox {
    pub id: DbId,
    pub shipment_id: DbId,
    pub box_number: i32,
    pub piece_code: String,
    pub piece_meta: Option<serde_json::Value>,
    pub status_id: StatusId,
    pub rack_id: Option<DbId>,
    pub assigned_at: Option<Timestamp>,
    pub released_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The projection of a stored box fed to the pallet usage calculator:
/// box row joined with its shipment's boxes-per-pallet figure.
#[derive(Debug, Clone, FromRow)]
pub struct StoredBoxRow {
    pub shipment_id: DbId,
    pub boxes_per_pallet: Option<i32>,
    pub box_number: i32,
    pub piece_meta: Option<serde_json::Value>,
}

impl StoredBoxRow {
    pub fn to_view(&self) -> BoxView {
        BoxView {
            shipment_id: Some(self.shipment_id),
            boxes_per_pallet: self.boxes_per_pallet,
            box_number: self.box_number,
            piece_meta: PieceMeta::parse(self.piece_meta.as_ref()),
        }
    }
}
