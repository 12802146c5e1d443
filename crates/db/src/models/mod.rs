//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Cross-entity operation inputs/outcomes live in [`storage`].

pub mod client;
pub mod rack;
pub mod rack_activity;
pub mod rack_inventory;
pub mod shipment;
pub mod shipment_box;
pub mod shipment_settings;
pub mod status;
pub mod storage;
