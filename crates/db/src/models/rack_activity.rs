//! Rack activity model: the append-only audit trail.
//!
//! Entries are immutable once created (no `updated_at`, no update DTO).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stowage_core::types::{DbId, Timestamp};

/// Activity type recorded when boxes are placed on a rack.
pub const ACTIVITY_ASSIGN: &str = "assign";
/// Activity type recorded when boxes leave a rack.
pub const ACTIVITY_RELEASE: &str = "release";

/// A row from the `rack_activity` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RackActivity {
    pub id: DbId,
    pub rack_id: DbId,
    pub user_id: Option<DbId>,
    pub activity_type: String,
    pub detail: String,
    pub quantity: i32,
    pub created_at: Timestamp,
}

/// DTO for appending an activity entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRackActivity {
    pub rack_id: DbId,
    pub user_id: Option<DbId>,
    pub activity_type: String,
    pub detail: String,
    pub quantity: i32,
}
