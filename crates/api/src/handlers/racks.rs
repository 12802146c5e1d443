//! Handlers for the `/racks` resource.
//!
//! Every read reconciles the served `capacity_used` against pallet usage
//! recomputed from the boxes actually stored on the rack, so a stale cached
//! counter never leaks into a response. The recomputed figure is served, not
//! written back; persistence happens only inside the mutating transactions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use stowage_core::capacity::utilization_pct;
use stowage_core::error::CoreError;
use stowage_core::types::DbId;
use stowage_db::models::rack::{CreateRack, Rack, UpdateRack};
use stowage_db::models::rack_inventory::RackInventory;
use stowage_db::models::status::RackStatus;
use stowage_db::repositories::rack_repo::RackDelete;
use stowage_db::repositories::{RackActivityRepo, RackInventoryRepo, RackRepo, StorageRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// A rack as served to callers: row fields with the reconciled usage,
/// derived status label, and utilization.
#[derive(Debug, Serialize)]
pub struct RackView {
    #[serde(flatten)]
    pub rack: Rack,
    pub status: &'static str,
    pub utilization_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<RackInventory>>,
}

async fn reconciled_view(
    state: &AppState,
    company_id: DbId,
    mut rack: Rack,
    with_inventory: bool,
) -> AppResult<RackView> {
    let usage = StorageRepo::recompute_rack_usage(&state.pool, company_id, rack.id).await?;
    let status = RackStatus::derive(rack.status_id, rack.capacity_total, usage);
    rack.capacity_used = usage;

    let inventory = if with_inventory {
        Some(RackInventoryRepo::list_by_rack(&state.pool, rack.id).await?)
    } else {
        None
    };

    Ok(RackView {
        utilization_pct: utilization_pct(rack.capacity_total, usage),
        status: status.label(),
        rack,
        inventory,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/racks
///
/// Create a rack. Codes are unique per company; a duplicate returns 409.
pub async fn create(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<CreateRack>,
) -> AppResult<impl IntoResponse> {
    if input.code.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Rack code must not be empty".into(),
        )));
    }
    if input.capacity_total < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "capacity_total must not be negative".into(),
        )));
    }

    let rack = RackRepo::create(&state.pool, user.company_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rack })))
}

/// GET /api/v1/racks
///
/// List the company's racks with reconciled usage.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let racks =
        RackRepo::list_by_company(&state.pool, user.company_id, params.limit(), params.offset())
            .await?;

    let mut views = Vec::with_capacity(racks.len());
    for rack in racks {
        views.push(reconciled_view(&state, user.company_id, rack, false).await?);
    }
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/racks/{id}
///
/// Reconciled rack detail including current inventory.
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rack = RackRepo::find_by_id(&state.pool, user.company_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Rack", id }))?;
    let view = reconciled_view(&state, user.company_id, rack, true).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/racks/{id}
///
/// Update rack attributes. Capacity bookkeeping is untouched here.
pub async fn update(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRack>,
) -> AppResult<impl IntoResponse> {
    if let Some(capacity_total) = input.capacity_total {
        if capacity_total < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "capacity_total must not be negative".into(),
            )));
        }
    }

    let rack = RackRepo::update(&state.pool, user.company_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Rack", id }))?;
    let view = reconciled_view(&state, user.company_id, rack, false).await?;
    Ok(Json(DataResponse { data: view }))
}

/// DELETE /api/v1/racks/{id}
///
/// Delete a rack unless boxes are still stored on it.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    match RackRepo::delete(&state.pool, user.company_id, id).await? {
        RackDelete::Deleted => Ok(StatusCode::NO_CONTENT),
        RackDelete::NotFound => Err(AppError::Core(CoreError::NotFound { entity: "Rack", id })),
        RackDelete::Occupied => Err(AppError::Core(CoreError::Conflict(
            "Rack still holds stored boxes and cannot be deleted".into(),
        ))),
    }
}

/// GET /api/v1/racks/{id}/activity
///
/// The rack's append-only audit trail, newest first.
pub async fn activity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    // Scope check before touching the activity table: the trail itself has
    // no company column.
    RackRepo::find_by_id(&state.pool, user.company_id, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Rack", id }))?;

    let entries =
        RackActivityRepo::list_by_rack(&state.pool, id, params.limit(), params.offset()).await?;
    Ok(Json(DataResponse { data: entries }))
}
