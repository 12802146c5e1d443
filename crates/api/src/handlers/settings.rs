//! Handlers for the per-company shipment settings resource.
//!
//! Settings are read fresh on every request that consumes them; there is no
//! process-wide cache to invalidate. The row is created lazily with
//! database defaults on first access.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use stowage_core::error::CoreError;
use stowage_db::models::shipment_settings::UpdateShipmentSettings;
use stowage_db::repositories::ShipmentSettingsRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/settings
///
/// The caller's company settings, created with defaults if absent.
pub async fn get(State(state): State<AppState>, user: AuthUser) -> AppResult<impl IntoResponse> {
    let settings =
        ShipmentSettingsRepo::find_or_create_default(&state.pool, user.company_id).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/settings
///
/// Apply the non-`None` fields of the update to the company's settings.
pub async fn update(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Json(input): Json<UpdateShipmentSettings>,
) -> AppResult<impl IntoResponse> {
    if let Some(storage_type) = input.default_storage_type.as_deref() {
        if storage_type != "personal" && storage_type != "commercial" {
            return Err(AppError::Core(CoreError::Validation(
                "default_storage_type must be 'personal' or 'commercial'".into(),
            )));
        }
    }
    if let Some(min_boxes) = input.partial_release_min_boxes {
        if min_boxes < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "partial_release_min_boxes must not be negative".into(),
            )));
        }
    }
    if let Some(days) = input.minimum_charge_days {
        if days < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "minimum_charge_days must not be negative".into(),
            )));
        }
    }

    let settings = ShipmentSettingsRepo::update(&state.pool, user.company_id, &input).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// POST /api/v1/settings/reset
///
/// Reset the company's settings to the documented defaults.
pub async fn reset(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
) -> AppResult<impl IntoResponse> {
    let settings = ShipmentSettingsRepo::reset(&state.pool, user.company_id).await?;
    Ok(Json(DataResponse { data: settings }))
}
