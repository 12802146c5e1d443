//! QR token composition for shipments and boxes.
//!
//! The master token identifies a shipment; each box carries a derived token
//! embedding the master, its own number, and the declared total. Pure
//! functions: the issue time is a parameter so tokens are reproducible in
//! tests.

use crate::types::Timestamp;

/// Prefix used when a company has QR auto-generation disabled.
pub const FALLBACK_PREFIX: &str = "STOW";

/// Compose a shipment's master QR token.
///
/// Shape: `<prefix>-<yyyymmddHHMMSS>[-P<pallets>][-B<boxes_per_pallet>]-<total>`.
/// The pallet segments appear only when the shipment declares them.
pub fn master_token(
    prefix: &str,
    issued_at: Timestamp,
    pallet_count: Option<i32>,
    boxes_per_pallet: Option<i32>,
    total_boxes: i32,
) -> String {
    let mut token = format!("{}-{}", prefix, issued_at.format("%Y%m%d%H%M%S"));
    if let Some(pallets) = pallet_count.filter(|n| *n > 0) {
        token.push_str(&format!("-P{pallets}"));
    }
    if let Some(per) = boxes_per_pallet.filter(|n| *n > 0) {
        token.push_str(&format!("-B{per}"));
    }
    token.push_str(&format!("-{total_boxes}"));
    token
}

/// Compose a box's piece code from its shipment's master token.
pub fn box_token(master: &str, box_number: i32, total_boxes: i32) -> String {
    format!("{master}-BX{box_number}/{total_boxes}")
}
