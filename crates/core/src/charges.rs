//! Storage and release charge computation.
//!
//! Charges are computed at release time from the company's pricing schedule.
//! All money is `rust_decimal::Decimal`; the day count is the only integer
//! term. Pure functions -- the caller supplies "now".

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::Timestamp;

const SECS_PER_DAY: i64 = 86_400;

/// Per-company pricing schedule, a projection of the company's shipment
/// settings.
#[derive(Debug, Clone)]
pub struct PricingSchedule {
    pub storage_rate_per_day: Decimal,
    pub storage_rate_per_box: Decimal,
    /// Stays below this many days are billed as this many days.
    pub minimum_charge_days: i32,
    pub release_handling_fee: Decimal,
    pub release_per_box_fee: Decimal,
    pub release_transport_fee: Decimal,
}

/// Itemized charges for one release operation.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeBreakdown {
    pub storage_days: i64,
    pub released_boxes: i32,
    pub storage_day_charge: Decimal,
    pub storage_box_charge: Decimal,
    pub handling_fee: Decimal,
    pub per_box_fee: Decimal,
    pub transport_fee: Decimal,
    pub total: Decimal,
}

/// Billable storage days: whole days elapsed since arrival, rounded up,
/// floored to the schedule's minimum.
pub fn storage_days(arrived_at: Timestamp, now: Timestamp, minimum_charge_days: i32) -> i64 {
    let elapsed_secs = (now - arrived_at).num_seconds().max(0);
    let days = (elapsed_secs as u64).div_ceil(SECS_PER_DAY as u64) as i64;
    days.max(i64::from(minimum_charge_days.max(0)))
}

/// Compute the itemized charge breakdown for releasing `released_boxes`
/// boxes from a shipment that arrived at `arrived_at`.
pub fn compute_release_charges(
    schedule: &PricingSchedule,
    arrived_at: Timestamp,
    now: Timestamp,
    released_boxes: i32,
) -> ChargeBreakdown {
    let days = storage_days(arrived_at, now, schedule.minimum_charge_days);
    let box_count = Decimal::from(released_boxes.max(0));

    let storage_day_charge = Decimal::from(days) * schedule.storage_rate_per_day;
    let storage_box_charge = box_count * schedule.storage_rate_per_box;
    let per_box_fee = box_count * schedule.release_per_box_fee;

    let total = storage_day_charge
        + storage_box_charge
        + schedule.release_handling_fee
        + per_box_fee
        + schedule.release_transport_fee;

    ChargeBreakdown {
        storage_days: days,
        released_boxes: released_boxes.max(0),
        storage_day_charge,
        storage_box_charge,
        handling_fee: schedule.release_handling_fee,
        per_box_fee,
        transport_fee: schedule.release_transport_fee,
        total,
    }
}
