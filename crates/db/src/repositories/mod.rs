//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&PgPool` as the first argument. Every query is scoped to the
//! caller's company. Multi-step lifecycle operations (provision / assign /
//! release) live in [`storage_repo`] and run inside a single transaction.

pub mod client_repo;
pub mod rack_activity_repo;
pub mod rack_inventory_repo;
pub mod rack_repo;
pub mod shipment_box_repo;
pub mod shipment_repo;
pub mod shipment_settings_repo;
pub mod storage_repo;

pub use client_repo::ClientRepo;
pub use rack_activity_repo::RackActivityRepo;
pub use rack_inventory_repo::RackInventoryRepo;
pub use rack_repo::RackRepo;
pub use shipment_box_repo::ShipmentBoxRepo;
pub use shipment_repo::ShipmentRepo;
pub use shipment_settings_repo::ShipmentSettingsRepo;
pub use storage_repo::StorageRepo;
