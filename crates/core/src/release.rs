//! Release policy gate.
//!
//! Run before any state is touched: a rejected release leaves boxes, racks,
//! and the shipment exactly as they were.

use crate::error::CoreError;

/// Release policy flags, a projection of the company's shipment settings.
#[derive(Debug, Clone, Default)]
pub struct ReleaseRules {
    pub allow_partial_release: bool,
    pub partial_release_min_boxes: i32,
    pub partial_release_require_approval: bool,
    pub require_id_verification: bool,
    pub require_release_photos: bool,
}

/// The policy-relevant shape of a release request.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseRequestView {
    pub release_all: bool,
    /// Number of box numbers requested (ignored when `release_all`).
    pub requested_boxes: usize,
    pub has_collector_id: bool,
    pub has_photos: bool,
    pub has_approval_reference: bool,
}

/// Validate a release request against company policy.
pub fn validate_release_request(
    rules: &ReleaseRules,
    request: ReleaseRequestView,
) -> Result<(), CoreError> {
    if rules.require_id_verification && !request.has_collector_id {
        return Err(CoreError::Validation(
            "Collector ID verification is required for release".into(),
        ));
    }
    if rules.require_release_photos && !request.has_photos {
        return Err(CoreError::Validation(
            "Release photos are required by company settings".into(),
        ));
    }

    if request.release_all {
        return Ok(());
    }

    if !rules.allow_partial_release {
        return Err(CoreError::Validation(
            "Partial release is not allowed by company settings".into(),
        ));
    }
    if request.requested_boxes < rules.partial_release_min_boxes.max(0) as usize {
        return Err(CoreError::Validation(format!(
            "Minimum {} boxes required for partial release",
            rules.partial_release_min_boxes
        )));
    }
    if rules.partial_release_require_approval && !request.has_approval_reference {
        return Err(CoreError::Validation(
            "Partial release requires an approval reference".into(),
        ));
    }
    Ok(())
}
