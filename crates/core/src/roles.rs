//! Well-known role name constants.
//!
//! These must match the role names carried in JWT claims by the identity
//! provider that issues tokens for this service.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_WORKER: &str = "worker";
