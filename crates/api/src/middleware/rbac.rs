//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the minimum requirement. Use these in route handlers to enforce
//! authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stowage_core::error::CoreError;
use stowage_core::roles::{ROLE_ADMIN, ROLE_MANAGER, ROLE_WORKER};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` or `manager` role. Rejects with 403 Forbidden
/// otherwise. Provisioning, release, rack administration, and settings all
/// sit behind this gate.
///
/// ```ignore
/// async fn manager_only(RequireManager(user): RequireManager) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_MANAGER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Manager or Admin role required".into(),
            )));
        }
        Ok(RequireManager(user))
    }
}

/// Requires the `admin`, `manager`, or `worker` role. Rejects with 403
/// Forbidden otherwise. Box assignment is scanner-driven floor work, so
/// workers can perform it.
///
/// ```ignore
/// async fn floor_work(RequireWorker(user): RequireWorker) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireWorker(pub AuthUser);

impl FromRequestParts<AppState> for RequireWorker {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN && user.role != ROLE_MANAGER && user.role != ROLE_WORKER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Worker, Manager, or Admin role required".into(),
            )));
        }
        Ok(RequireWorker(user))
    }
}
