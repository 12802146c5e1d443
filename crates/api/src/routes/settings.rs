//! Route definitions for per-company shipment settings.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET  /        -> get (lazy default creation)
/// PUT  /        -> update
/// POST /reset   -> reset to defaults
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::get).put(settings::update))
        .route("/reset", post(settings::reset))
}
