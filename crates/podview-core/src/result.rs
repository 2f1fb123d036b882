//! Convenience result type alias for PodView.

use crate::error::AppError;

/// A specialized `Result` type for PodView operations.
pub type AppResult<T> = Result<T, AppError>;
