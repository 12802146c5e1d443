//! Domain logic for the storage engine.
//!
//! Everything in this crate is pure: no I/O, no clocks, no database. The
//! persistence layer (`stowage-db`) and HTTP layer (`stowage-api`) feed it
//! data and act on its results.

pub mod capacity;
pub mod charges;
pub mod error;
pub mod intake;
pub mod pallet;
pub mod qr;
pub mod release;
pub mod roles;
pub mod types;
