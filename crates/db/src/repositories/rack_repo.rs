//! Repository for the `racks` table.

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::rack::{CreateRack, Rack, UpdateRack};
use crate::models::status::BoxStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, code, rack_type, capacity_total, capacity_used, \
    status_id, notes, last_activity_at, created_at, updated_at";

/// Outcome of a guarded rack deletion.
#[derive(Debug, PartialEq, Eq)]
pub enum RackDelete {
    Deleted,
    NotFound,
    /// The rack still physically holds boxes and cannot be removed.
    Occupied,
}

/// Provides CRUD operations for racks. Capacity mutation belongs to
/// `StorageRepo`; this repository never touches `capacity_used`.
pub struct RackRepo;

impl RackRepo {
    /// Insert a new rack, returning the created row.
    ///
    /// If `rack_type` is `None`, defaults to `'storage'`. A duplicate code
    /// within the company violates `uq_racks_company_code`.
    pub async fn create(
        pool: &PgPool,
        company_id: DbId,
        input: &CreateRack,
    ) -> Result<Rack, sqlx::Error> {
        let query = format!(
            "INSERT INTO racks (company_id, code, rack_type, capacity_total, notes)
             VALUES ($1, $2, COALESCE($3, 'storage'), $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rack>(&query)
            .bind(company_id)
            .bind(&input.code)
            .bind(&input.rack_type)
            .bind(input.capacity_total)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    /// Find a rack by its internal ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Rack>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM racks WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, Rack>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's racks ordered by code.
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Rack>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM racks
             WHERE company_id = $1
             ORDER BY code ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Rack>(&query)
            .bind(company_id)
            .bind(limit.clamp(1, 500))
            .bind(offset.max(0))
            .fetch_all(pool)
            .await
    }

    /// Update a rack. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row matches within the company.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
        input: &UpdateRack,
    ) -> Result<Option<Rack>, sqlx::Error> {
        let query = format!(
            "UPDATE racks SET
                code = COALESCE($3, code),
                rack_type = COALESCE($4, rack_type),
                capacity_total = COALESCE($5, capacity_total),
                notes = COALESCE($6, notes)
             WHERE id = $1 AND company_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rack>(&query)
            .bind(id)
            .bind(company_id)
            .bind(&input.code)
            .bind(&input.rack_type)
            .bind(input.capacity_total)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a rack unless it still physically holds boxes.
    ///
    /// The existence check, occupancy check, and delete run in one
    /// transaction with the rack row locked, so a concurrent assignment
    /// cannot slip boxes onto a rack mid-deletion.
    pub async fn delete(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<RackDelete, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let rack: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM racks WHERE id = $1 AND company_id = $2 FOR UPDATE")
                .bind(id)
                .bind(company_id)
                .fetch_optional(&mut *tx)
                .await?;
        if rack.is_none() {
            return Ok(RackDelete::NotFound);
        }

        let stored: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shipment_boxes WHERE rack_id = $1 AND status_id IN ($2, $3)",
        )
        .bind(id)
        .bind(BoxStatus::InStorage.id())
        .bind(BoxStatus::Stored.id())
        .fetch_one(&mut *tx)
        .await?;
        if stored.0 > 0 {
            return Ok(RackDelete::Occupied);
        }

        sqlx::query("DELETE FROM racks WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(RackDelete::Deleted)
    }
}
