use std::sync::Arc;

use crate::config::ServerConfig;
use crate::notify::Notifier;
use crate::photos::PhotoStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stowage_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Evidentiary photo storage.
    pub photos: Arc<PhotoStore>,
    /// Release notification channel.
    pub notifier: Arc<dyn Notifier>,
}
