//! Pallet usage calculation.
//!
//! Racks are measured in pallet slots, not boxes. A shipment's boxes group
//! into slots either by an explicit pallet number carried in the per-box
//! piece metadata, or positionally by the shipment's boxes-per-pallet
//! figure. Loose (non-palletized) boxes occupy no slot at all.

use std::collections::HashSet;

use crate::types::DbId;

/// Boxes-per-pallet fallback when the shipment declares none (or a
/// non-positive value): one box, one slot.
pub const DEFAULT_BOXES_PER_PALLET: i32 = 1;

/// Shipment-key component for boxes whose shipment cannot be resolved.
///
/// All such boxes group under this shared component, segregated from every
/// real shipment but pooled with each other by pallet index. This can
/// undercount distinct unknown-shipment pallets; see the grouping tests.
const UNKNOWN_SHIPMENT: DbId = -1;

// ---------------------------------------------------------------------------
// Piece metadata
// ---------------------------------------------------------------------------

/// Pallet-relevant metadata carried on a box's piece code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceMeta {
    /// No pallet declaration; the box groups by its sequential number.
    Untracked,
    /// The box sits on an explicitly numbered pallet.
    ExplicitPallet(i64),
    /// The box is loose (non-palletized) and consumes no slot.
    Loose,
}

impl PieceMeta {
    /// Parse piece metadata from its raw JSON form.
    ///
    /// Scanner payloads are not trustworthy: any missing, malformed, or
    /// unexpected input falls back to [`PieceMeta::Untracked`] rather than
    /// erroring. Recognized fields on a JSON object:
    ///
    /// - `"loose": true` -- the box is non-palletized
    /// - `"pallet": <positive integer>` -- explicit pallet number (numeric
    ///   strings like `"3"` are accepted; scanners emit both)
    pub fn parse(raw: Option<&serde_json::Value>) -> Self {
        let Some(value) = raw else {
            return Self::Untracked;
        };
        let Some(obj) = value.as_object() else {
            return Self::Untracked;
        };

        if obj.get("loose").and_then(|v| v.as_bool()) == Some(true) {
            return Self::Loose;
        }

        match obj.get("pallet").and_then(lenient_i64) {
            Some(n) if n > 0 => Self::ExplicitPallet(n),
            _ => Self::Untracked,
        }
    }
}

/// Accept both JSON numbers and numeric strings.
fn lenient_i64(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

// ---------------------------------------------------------------------------
// Box view
// ---------------------------------------------------------------------------

/// The minimal projection of a stored box needed to compute pallet usage.
#[derive(Debug, Clone)]
pub struct BoxView {
    pub shipment_id: Option<DbId>,
    /// The owning shipment's boxes-per-pallet figure, if declared.
    pub boxes_per_pallet: Option<i32>,
    /// Sequential box number within the shipment (1..N).
    pub box_number: i32,
    pub piece_meta: PieceMeta,
}

// ---------------------------------------------------------------------------
// Usage computation
// ---------------------------------------------------------------------------

/// Count the distinct pallet slots occupied by a set of boxes.
///
/// Deterministic and order-independent. Never fails: malformed or missing
/// data degrades to the conservative one-box-one-slot grouping.
pub fn pallet_usage(boxes: &[BoxView]) -> i32 {
    let mut slots: HashSet<(DbId, i64)> = HashSet::new();

    for b in boxes {
        let shipment = b.shipment_id.unwrap_or(UNKNOWN_SHIPMENT);
        match b.piece_meta {
            PieceMeta::Loose => continue,
            PieceMeta::ExplicitPallet(n) => {
                slots.insert((shipment, n));
            }
            PieceMeta::Untracked => {
                let per_pallet = match b.boxes_per_pallet {
                    Some(n) if n > 0 => n,
                    _ => DEFAULT_BOXES_PER_PALLET,
                };
                // ceil(box_number / per_pallet); out-of-range numbers clamp
                // to the first pallet rather than erroring.
                let number = b.box_number.max(1);
                let index = i64::from((number - 1) / per_pallet + 1);
                slots.insert((shipment, index));
            }
        }
    }

    slots.len() as i32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
