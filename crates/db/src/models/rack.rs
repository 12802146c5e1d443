//! Rack entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stowage_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `racks` table.
///
/// `capacity_used` is a cache: it is rewritten from recomputed pallet usage
/// inside every capacity-affecting transaction, and reconciled again on
/// read before being served.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rack {
    pub id: DbId,
    pub company_id: DbId,
    pub code: String,
    pub rack_type: String,
    pub capacity_total: i32,
    pub capacity_used: i32,
    pub status_id: StatusId,
    pub notes: Option<String>,
    pub last_activity_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new rack.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRack {
    pub code: String,
    /// Defaults to `'storage'` if omitted.
    pub rack_type: Option<String>,
    pub capacity_total: i32,
    pub notes: Option<String>,
}

/// DTO for updating an existing rack. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRack {
    pub code: Option<String>,
    pub rack_type: Option<String>,
    pub capacity_total: Option<i32>,
    pub notes: Option<String>,
}
