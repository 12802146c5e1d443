//! Repository for the `shipment_settings` table.
//!
//! Settings are fetched fresh on every request (no process-wide cache);
//! the row is created lazily with database defaults on first access.

use sqlx::PgPool;
use stowage_core::types::DbId;

use crate::models::shipment_settings::{ShipmentSettings, UpdateShipmentSettings};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, require_client_email, require_client_phone, \
    require_estimated_value, require_rack_assignment, default_storage_type, \
    auto_generate_qr, qr_prefix, allow_partial_release, partial_release_min_boxes, \
    partial_release_require_approval, require_id_verification, require_release_photos, \
    require_signature, generate_release_invoice, notify_client_on_release, \
    storage_rate_per_day, storage_rate_per_box, minimum_charge_days, \
    release_handling_fee, release_per_box_fee, release_transport_fee, \
    created_at, updated_at";

pub struct ShipmentSettingsRepo;

impl ShipmentSettingsRepo {
    /// Fetch a company's settings, creating the row with defaults if absent.
    ///
    /// The insert races benignly: `ON CONFLICT DO NOTHING` plus the re-read
    /// means two concurrent first accesses both observe the same row.
    pub async fn find_or_create_default(
        pool: &PgPool,
        company_id: DbId,
    ) -> Result<ShipmentSettings, sqlx::Error> {
        sqlx::query("INSERT INTO shipment_settings (company_id) VALUES ($1) ON CONFLICT ON CONSTRAINT uq_shipment_settings_company DO NOTHING")
            .bind(company_id)
            .execute(pool)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM shipment_settings WHERE company_id = $1");
        sqlx::query_as::<_, ShipmentSettings>(&query)
            .bind(company_id)
            .fetch_one(pool)
            .await
    }

    /// Update a company's settings. Only non-`None` fields are applied.
    /// Creates the row first if the company has never touched settings.
    pub async fn update(
        pool: &PgPool,
        company_id: DbId,
        input: &UpdateShipmentSettings,
    ) -> Result<ShipmentSettings, sqlx::Error> {
        // Ensure the row exists so a first-ever PUT behaves like read-then-update.
        Self::find_or_create_default(pool, company_id).await?;

        let query = format!(
            "UPDATE shipment_settings SET
                require_client_email = COALESCE($2, require_client_email),
                require_client_phone = COALESCE($3, require_client_phone),
                require_estimated_value = COALESCE($4, require_estimated_value),
                require_rack_assignment = COALESCE($5, require_rack_assignment),
                default_storage_type = COALESCE($6, default_storage_type),
                auto_generate_qr = COALESCE($7, auto_generate_qr),
                qr_prefix = COALESCE($8, qr_prefix),
                allow_partial_release = COALESCE($9, allow_partial_release),
                partial_release_min_boxes = COALESCE($10, partial_release_min_boxes),
                partial_release_require_approval = COALESCE($11, partial_release_require_approval),
                require_id_verification = COALESCE($12, require_id_verification),
                require_release_photos = COALESCE($13, require_release_photos),
                require_signature = COALESCE($14, require_signature),
                generate_release_invoice = COALESCE($15, generate_release_invoice),
                notify_client_on_release = COALESCE($16, notify_client_on_release),
                storage_rate_per_day = COALESCE($17, storage_rate_per_day),
                storage_rate_per_box = COALESCE($18, storage_rate_per_box),
                minimum_charge_days = COALESCE($19, minimum_charge_days),
                release_handling_fee = COALESCE($20, release_handling_fee),
                release_per_box_fee = COALESCE($21, release_per_box_fee),
                release_transport_fee = COALESCE($22, release_transport_fee)
             WHERE company_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ShipmentSettings>(&query)
            .bind(company_id)
            .bind(input.require_client_email)
            .bind(input.require_client_phone)
            .bind(input.require_estimated_value)
            .bind(input.require_rack_assignment)
            .bind(&input.default_storage_type)
            .bind(input.auto_generate_qr)
            .bind(&input.qr_prefix)
            .bind(input.allow_partial_release)
            .bind(input.partial_release_min_boxes)
            .bind(input.partial_release_require_approval)
            .bind(input.require_id_verification)
            .bind(input.require_release_photos)
            .bind(input.require_signature)
            .bind(input.generate_release_invoice)
            .bind(input.notify_client_on_release)
            .bind(input.storage_rate_per_day)
            .bind(input.storage_rate_per_box)
            .bind(input.minimum_charge_days)
            .bind(input.release_handling_fee)
            .bind(input.release_per_box_fee)
            .bind(input.release_transport_fee)
            .fetch_one(pool)
            .await
    }

    /// Reset a company's settings to the database defaults by dropping and
    /// lazily recreating the row.
    pub async fn reset(pool: &PgPool, company_id: DbId) -> Result<ShipmentSettings, sqlx::Error> {
        sqlx::query("DELETE FROM shipment_settings WHERE company_id = $1")
            .bind(company_id)
            .execute(pool)
            .await?;
        Self::find_or_create_default(pool, company_id).await
    }
}
