//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Used by any handler that supports paginated listing. Values are clamped
/// in the repository layer.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Effective limit, defaulting to 100.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(100)
    }

    /// Effective offset, defaulting to 0.
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}
