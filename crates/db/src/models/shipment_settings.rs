//! Per-company shipment policy settings.
//!
//! A row is created lazily with database defaults the first time a company's
//! settings are read. The conversion methods project the row onto the pure
//! policy types consumed by `stowage-core`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stowage_core::charges::PricingSchedule;
use stowage_core::intake::IntakeRules;
use stowage_core::qr::FALLBACK_PREFIX;
use stowage_core::release::ReleaseRules;
use stowage_core::types::{DbId, Timestamp};

/// A row from the `shipment_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShipmentSettings {
    pub id: DbId,
    pub company_id: DbId,

    pub require_client_email: bool,
    pub require_client_phone: bool,
    pub require_estimated_value: bool,
    pub require_rack_assignment: bool,
    pub default_storage_type: String,

    pub auto_generate_qr: bool,
    pub qr_prefix: String,

    pub allow_partial_release: bool,
    pub partial_release_min_boxes: i32,
    pub partial_release_require_approval: bool,
    pub require_id_verification: bool,
    pub require_release_photos: bool,
    pub require_signature: bool,
    pub generate_release_invoice: bool,
    pub notify_client_on_release: bool,

    pub storage_rate_per_day: Decimal,
    pub storage_rate_per_box: Decimal,
    pub minimum_charge_days: i32,
    pub release_handling_fee: Decimal,
    pub release_per_box_fee: Decimal,
    pub release_transport_fee: Decimal,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ShipmentSettings {
    pub fn intake_rules(&self) -> IntakeRules {
        IntakeRules {
            require_client_email: self.require_client_email,
            require_client_phone: self.require_client_phone,
            require_estimated_value: self.require_estimated_value,
            require_rack_assignment: self.require_rack_assignment,
        }
    }

    pub fn release_rules(&self) -> ReleaseRules {
        ReleaseRules {
            allow_partial_release: self.allow_partial_release,
            partial_release_min_boxes: self.partial_release_min_boxes,
            partial_release_require_approval: self.partial_release_require_approval,
            require_id_verification: self.require_id_verification,
            require_release_photos: self.require_release_photos,
        }
    }

    pub fn pricing(&self) -> PricingSchedule {
        PricingSchedule {
            storage_rate_per_day: self.storage_rate_per_day,
            storage_rate_per_box: self.storage_rate_per_box,
            minimum_charge_days: self.minimum_charge_days,
            release_handling_fee: self.release_handling_fee,
            release_per_box_fee: self.release_per_box_fee,
            release_transport_fee: self.release_transport_fee,
        }
    }

    /// The QR prefix for new master tokens: the configured prefix while
    /// auto-generation is on, the fixed fallback otherwise.
    pub fn effective_qr_prefix(&self) -> &str {
        if self.auto_generate_qr {
            &self.qr_prefix
        } else {
            FALLBACK_PREFIX
        }
    }
}

/// DTO for updating settings. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateShipmentSettings {
    pub require_client_email: Option<bool>,
    pub require_client_phone: Option<bool>,
    pub require_estimated_value: Option<bool>,
    pub require_rack_assignment: Option<bool>,
    pub default_storage_type: Option<String>,

    pub auto_generate_qr: Option<bool>,
    pub qr_prefix: Option<String>,

    pub allow_partial_release: Option<bool>,
    pub partial_release_min_boxes: Option<i32>,
    pub partial_release_require_approval: Option<bool>,
    pub require_id_verification: Option<bool>,
    pub require_release_photos: Option<bool>,
    pub require_signature: Option<bool>,
    pub generate_release_invoice: Option<bool>,
    pub notify_client_on_release: Option<bool>,

    pub storage_rate_per_day: Option<Decimal>,
    pub storage_rate_per_box: Option<Decimal>,
    pub minimum_charge_days: Option<i32>,
    pub release_handling_fee: Option<Decimal>,
    pub release_per_box_fee: Option<Decimal>,
    pub release_transport_fee: Option<Decimal>,
}
