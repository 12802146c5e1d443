pub mod health;
pub mod racks;
pub mod settings;
pub mod shipments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /shipments                       list, provision
/// /shipments/{id}                  detail (with boxes), delete (guarded)
/// /shipments/{id}/assign           assign boxes to a rack (multipart)
/// /shipments/{id}/release          release boxes (multipart)
///
/// /racks                           list (reconciled), create
/// /racks/{id}                      detail (reconciled, with inventory),
///                                  update, delete (guarded)
/// /racks/{id}/activity             audit trail
///
/// /settings                        get, update
/// /settings/reset                  reset to defaults (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/shipments", shipments::router())
        .nest("/racks", racks::router())
        .nest("/settings", settings::router())
}
