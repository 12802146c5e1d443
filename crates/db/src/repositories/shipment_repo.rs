//! Repository for the `shipments` table.
//!
//! Provisioning (shipment + box batch + optional intake assignment) is a
//! multi-step transaction owned by `StorageRepo`; this repository covers
//! plain reads and the guarded delete.

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::shipment::Shipment;
use crate::models::status::BoxStatus;

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, company_id, reference_code, client_id, client_name, \
    client_email, client_phone, shipment_type, original_box_count, current_box_count, \
    pallet_count, boxes_per_pallet, estimated_value, master_qr, status_id, arrived_at, \
    assigned_at, released_at, created_at, updated_at";

/// Outcome of a guarded shipment deletion.
#[derive(Debug, PartialEq, Eq)]
pub enum ShipmentDelete {
    Deleted,
    NotFound,
    /// Some boxes are still physically stored; release them first.
    BoxesInStorage,
}

pub struct ShipmentRepo;

impl ShipmentRepo {
    /// Find a shipment by its internal ID within a company.
    pub async fn find_by_id(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<Option<Shipment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shipments WHERE id = $1 AND company_id = $2");
        sqlx::query_as::<_, Shipment>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// List a company's shipments, newest first.
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Shipment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shipments
             WHERE company_id = $1
             ORDER BY arrived_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Shipment>(&query)
            .bind(company_id)
            .bind(limit.clamp(1, 500))
            .bind(offset.max(0))
            .fetch_all(pool)
            .await
    }

    /// Delete a shipment and (by cascade) its boxes, unless any box is
    /// still physically stored on a rack.
    pub async fn delete(
        pool: &PgPool,
        company_id: DbId,
        id: DbId,
    ) -> Result<ShipmentDelete, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let shipment: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM shipments WHERE id = $1 AND company_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?;
        if shipment.is_none() {
            return Ok(ShipmentDelete::NotFound);
        }

        let stored: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM shipment_boxes \
             WHERE shipment_id = $1 AND status_id IN ($2, $3)",
        )
        .bind(id)
        .bind(BoxStatus::InStorage.id())
        .bind(BoxStatus::Stored.id())
        .fetch_one(&mut *tx)
        .await?;
        if stored.0 > 0 {
            return Ok(ShipmentDelete::BoxesInStorage);
        }

        sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(ShipmentDelete::Deleted)
    }
}
