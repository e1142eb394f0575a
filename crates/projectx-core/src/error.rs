//! Unified application error types for ProjectX.
//!
//! Every crate maps its internal errors into [`AppError`] so that the query
//! engine, the store adapters and the binary share one propagation path.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error kind categorization used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested record was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A uniqueness or referential constraint was violated.
    Conflict,
    /// The caller misused the engine (bad sort key, paging misuse, bad fetch graph).
    Configuration,
    /// A sort key walks through a to-many relation.
    UnsafeOrdering,
    /// A single-result lookup matched more than one record.
    NonUniqueResult,
    /// A chunked bulk mutation failed after earlier chunks were applied.
    PartialMutation,
    /// The store reported a failure.
    Database,
    /// A column value could not be decoded into its entity field.
    Serialization,
    /// An internal invariant was broken.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::UnsafeOrdering => write!(f, "UNSAFE_ORDERING"),
            Self::NonUniqueResult => write!(f, "NON_UNIQUE_RESULT"),
            Self::PartialMutation => write!(f, "PARTIAL_MUTATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Progress of a chunked bulk mutation at the moment it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkProgress {
    /// Chunks whose statement completed successfully.
    pub completed_chunks: usize,
    /// Chunks the operation was split into.
    pub total_chunks: usize,
    /// Rows affected by the completed chunks.
    pub affected_rows: u64,
}

/// Structured context attached to an [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorDetail {
    /// The entity type and the field (or sort key, or relation) that caused the error.
    Field { entity: String, field: String },
    /// Partial progress of a bulk mutation.
    Bulk(BulkProgress),
}

/// The unified application error used throughout ProjectX.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional structured context.
    pub detail: Option<ErrorDetail>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured context to this error.
    pub fn with_detail(mut self, detail: ErrorDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a configuration error naming the entity and the offending field.
    pub fn invalid_field(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Configuration, message).with_detail(ErrorDetail::Field {
            entity: entity.into(),
            field: field.into(),
        })
    }

    /// Create an unsafe-ordering error for a sort key that crosses a to-many relation.
    pub fn unsafe_ordering(entity: impl Into<String>, key: impl Into<String>) -> Self {
        let entity = entity.into();
        let key = key.into();
        Self::new(
            ErrorKind::UnsafeOrdering,
            format!("Sort key '{key}' on {entity} traverses a to-many relation"),
        )
        .with_detail(ErrorDetail::Field { entity, field: key })
    }

    /// Create a non-unique-result error.
    pub fn non_unique(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorKind::NonUniqueResult,
            format!("Expected at most one {entity} but the query matched several"),
        )
    }

    /// Wrap the failure of a bulk chunk together with the progress made so far.
    pub fn partial_mutation(progress: BulkProgress, source: AppError) -> Self {
        Self::with_source(
            ErrorKind::PartialMutation,
            format!(
                "Bulk mutation stopped after {} of {} chunks ({} rows affected)",
                progress.completed_chunks, progress.total_chunks, progress.affected_rows
            ),
            source,
        )
        .with_detail(ErrorDetail::Bulk(progress))
    }

    /// Return the bulk progress attached to this error, if any.
    pub fn bulk_progress(&self) -> Option<BulkProgress> {
        match self.detail {
            Some(ErrorDetail::Bulk(progress)) => Some(progress),
            _ => None,
        }
    }
}

/// Copies kind, message and detail. The boxed `source` is not cloneable and
/// is left out, so a cloned `PartialMutation` keeps its `BulkProgress` but not
/// the store error that stopped it.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            detail: self.detail.clone(),
            source: None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
