//! Shipment entity model and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stowage_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::status::StatusId;

/// A row from the `shipments` table.
///
/// `current_box_count` always equals the number of boxes not yet released.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Shipment {
    pub id: DbId,
    pub company_id: DbId,
    pub reference_code: String,
    pub client_id: Option<DbId>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub shipment_type: String,
    pub original_box_count: i32,
    pub current_box_count: i32,
    pub pallet_count: Option<i32>,
    pub boxes_per_pallet: Option<i32>,
    pub estimated_value: Option<Decimal>,
    pub master_qr: String,
    pub status_id: StatusId,
    pub arrived_at: Timestamp,
    pub assigned_at: Option<Timestamp>,
    pub released_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for provisioning a new shipment (request body shape).
///
/// The box count resolves from `original_box_count`, falling back to
/// `pallet_count * boxes_per_pallet`. Supplying `rack_id` assigns every box
/// to that rack at intake.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateShipment {
    #[validate(length(min = 1, message = "reference_code must not be empty"))]
    pub reference_code: String,
    pub client_id: Option<DbId>,
    pub client_name: Option<String>,
    #[validate(email(message = "client_email must be a valid email address"))]
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    /// Defaults to the company's configured storage type if omitted.
    pub shipment_type: Option<String>,
    pub original_box_count: Option<i32>,
    pub pallet_count: Option<i32>,
    pub boxes_per_pallet: Option<i32>,
    pub estimated_value: Option<Decimal>,
    pub rack_id: Option<DbId>,
}
