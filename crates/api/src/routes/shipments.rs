//! Route definitions for shipments and their lifecycle operations.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::shipments;
use crate::state::AppState;

/// Routes mounted at `/shipments`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> provision
/// GET    /{id}            -> get_by_id (with boxes)
/// DELETE /{id}            -> delete (guarded while boxes stored)
/// POST   /{id}/assign     -> assign (multipart)
/// POST   /{id}/release    -> release (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(shipments::list).post(shipments::provision))
        .route(
            "/{id}",
            get(shipments::get_by_id).delete(shipments::delete),
        )
        .route("/{id}/assign", post(shipments::assign))
        .route("/{id}/release", post(shipments::release))
}
