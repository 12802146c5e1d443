//! Inputs and outcomes for the storage lifecycle operations
//! (provision / assign / release), which span racks, boxes, shipments,
//! inventory, and the activity log.

use serde::Serialize;
use stowage_core::types::DbId;

use crate::models::shipment::Shipment;
use crate::models::status::StatusId;

/// Input for provisioning a shipment's rows, prepared by the caller after
/// policy validation: counts resolved, QR tokens composed.
#[derive(Debug, Clone)]
pub struct ProvisionShipment {
    pub company_id: DbId,
    pub user_id: DbId,
    pub reference_code: String,
    pub client_id: Option<DbId>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub shipment_type: String,
    pub total_boxes: i32,
    pub pallet_count: Option<i32>,
    pub boxes_per_pallet: Option<i32>,
    pub estimated_value: Option<rust_decimal::Decimal>,
    pub master_qr: String,
    /// Per-box piece codes, one per box, in box-number order.
    pub box_codes: Vec<String>,
    /// Assign every box to this rack at intake.
    pub rack_id: Option<DbId>,
}

/// Outcome of provisioning.
#[derive(Debug)]
pub enum ProvisionResult {
    Created(Shipment),
    /// The immediate-assignment rack does not exist in this company.
    RackNotFound,
}

/// Input for assigning a batch of boxes to a rack.
#[derive(Debug, Clone)]
pub struct AssignBoxes {
    pub company_id: DbId,
    pub user_id: DbId,
    pub shipment_id: DbId,
    pub rack_id: DbId,
    pub box_numbers: Vec<i32>,
    /// Photo evidence already persisted by the storage boundary; only the
    /// count lands in the activity detail.
    pub photo_count: usize,
}

/// Outcome of a successful assignment.
#[derive(Debug, Serialize)]
pub struct AssignOutcome {
    pub assigned_count: i32,
    pub shipment_status_id: StatusId,
    /// The rack's pallet usage as recomputed and persisted in-transaction.
    pub rack_capacity_used: i32,
}

#[derive(Debug)]
pub enum AssignResult {
    Assigned(AssignOutcome),
    ShipmentNotFound,
    RackNotFound,
}

/// Input for releasing boxes from storage.
#[derive(Debug, Clone)]
pub struct ReleaseBoxes {
    pub company_id: DbId,
    pub user_id: DbId,
    pub shipment_id: DbId,
    /// `None` releases every currently stored box; otherwise the requested
    /// numbers are intersected with the currently stored set.
    pub box_numbers: Option<Vec<i32>>,
    pub photo_count: usize,
}

/// Per-rack slice of a release.
#[derive(Debug, Serialize)]
pub struct RackRelease {
    pub rack_id: DbId,
    pub released_count: i32,
    pub capacity_used: i32,
}

/// Outcome of a successful release.
#[derive(Debug, Serialize)]
pub struct ReleaseOutcome {
    pub released_count: i32,
    pub remaining_count: i32,
    pub shipment_status_id: StatusId,
    pub racks: Vec<RackRelease>,
}

#[derive(Debug)]
pub enum ReleaseResult {
    Released(ReleaseOutcome),
    ShipmentNotFound,
    /// No requested box is currently stored; nothing to do.
    NothingToRelease,
}
