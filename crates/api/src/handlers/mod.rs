//! HTTP handlers, one module per resource.

pub mod racks;
pub mod settings;
pub mod shipments;
