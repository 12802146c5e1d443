//! Route definitions for racks.

use axum::routing::get;
use axum::Router;

use crate::handlers::racks;
use crate::state::AppState;

/// Routes mounted at `/racks`.
///
/// ```text
/// GET    /                -> list (reconciled)
/// POST   /                -> create
/// GET    /{id}            -> get_by_id (reconciled, with inventory)
/// PUT    /{id}            -> update
/// DELETE /{id}            -> delete (guarded while occupied)
/// GET    /{id}/activity   -> activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(racks::list).post(racks::create))
        .route(
            "/{id}",
            get(racks::get_by_id)
                .put(racks::update)
                .delete(racks::delete),
        )
        .route("/{id}/activity", get(racks::activity))
}
