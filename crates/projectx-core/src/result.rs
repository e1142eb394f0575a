//! Convenience result type alias for ProjectX.

use crate::error::AppError;

/// A specialized `Result` type for ProjectX operations.
pub type AppResult<T> = Result<T, AppError>;
