//! Intake (provisioning) validation.
//!
//! Policy comes from the company's shipment settings; the request projection
//! carries only the fields the gate inspects. Every rejection names the
//! offending field so the caller can correct it.

use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::types::DbId;

/// Intake policy flags, a projection of the company's shipment settings.
#[derive(Debug, Clone, Default)]
pub struct IntakeRules {
    pub require_client_email: bool,
    pub require_client_phone: bool,
    pub require_estimated_value: bool,
    pub require_rack_assignment: bool,
}

/// The intake-relevant slice of a provisioning request.
#[derive(Debug, Clone, Default)]
pub struct IntakeRequestView<'a> {
    pub client_email: Option<&'a str>,
    pub client_phone: Option<&'a str>,
    pub estimated_value: Option<Decimal>,
    pub rack_id: Option<DbId>,
}

/// Resolve the total box count for a new shipment.
///
/// An explicit count wins; otherwise it is derived as
/// `pallet_count * boxes_per_pallet`. A shipment whose count cannot be
/// resolved to a positive integer is rejected.
pub fn resolve_box_count(
    original_box_count: Option<i32>,
    pallet_count: Option<i32>,
    boxes_per_pallet: Option<i32>,
) -> Result<i32, CoreError> {
    if let Some(count) = original_box_count {
        if count > 0 {
            return Ok(count);
        }
        return Err(CoreError::Validation(
            "original_box_count must be a positive integer".into(),
        ));
    }

    match (pallet_count, boxes_per_pallet) {
        (Some(pallets), Some(per)) if pallets > 0 && per > 0 => {
            pallets.checked_mul(per).ok_or_else(|| {
                CoreError::Validation(
                    "pallet_count x boxes_per_pallet overflows the box count".into(),
                )
            })
        }
        _ => Err(CoreError::Validation(
            "Box count could not be resolved: provide original_box_count, or both \
             pallet_count and boxes_per_pallet"
                .into(),
        )),
    }
}

/// Enforce the settings-required fields on an intake request.
pub fn validate_required_fields(
    rules: &IntakeRules,
    request: &IntakeRequestView<'_>,
) -> Result<(), CoreError> {
    if rules.require_client_email && request.client_email.map_or(true, str::is_empty) {
        return Err(CoreError::Validation(
            "client_email is required by company settings".into(),
        ));
    }
    if rules.require_client_phone && request.client_phone.map_or(true, str::is_empty) {
        return Err(CoreError::Validation(
            "client_phone is required by company settings".into(),
        ));
    }
    if rules.require_estimated_value && request.estimated_value.is_none() {
        return Err(CoreError::Validation(
            "estimated_value is required by company settings".into(),
        ));
    }
    if rules.require_rack_assignment && request.rack_id.is_none() {
        return Err(CoreError::Validation(
            "rack_id is required by company settings: shipments must be assigned on intake"
                .into(),
        ));
    }
    Ok(())
}
