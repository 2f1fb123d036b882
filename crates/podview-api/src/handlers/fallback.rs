//! Catch-all for paths no host or plugin route serves.

use axum::extract::Request;

use podview_core::error::AppError;

use crate::error::ApiError;

/// Responds 404 with the standard JSON error body.
pub async fn not_found(request: Request) -> ApiError {
    ApiError::from(AppError::not_found(format!(
        "No route for {} {}",
        request.method(),
        request.uri().path()
    )))
}
