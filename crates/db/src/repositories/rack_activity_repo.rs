//! Repository for the `rack_activity` table (append-only).

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::rack_activity::{CreateRackActivity, RackActivity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, rack_id, user_id, activity_type, detail, quantity, created_at";

/// Append/read operations for the rack audit trail. Entries are never
/// updated or deleted.
pub struct RackActivityRepo;

impl RackActivityRepo {
    /// Append an activity entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateRackActivity,
    ) -> Result<RackActivity, sqlx::Error> {
        let query = format!(
            "INSERT INTO rack_activity (rack_id, user_id, activity_type, detail, quantity)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RackActivity>(&query)
            .bind(input.rack_id)
            .bind(input.user_id)
            .bind(&input.activity_type)
            .bind(&input.detail)
            .bind(input.quantity)
            .fetch_one(pool)
            .await
    }

    /// List a rack's activity, newest first.
    pub async fn list_by_rack(
        pool: &PgPool,
        rack_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RackActivity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rack_activity
             WHERE rack_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, RackActivity>(&query)
            .bind(rack_id)
            .bind(limit.clamp(1, 500))
            .bind(offset.max(0))
            .fetch_all(pool)
            .await
    }
}
