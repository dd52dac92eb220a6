//! Error types for uptree.

use thiserror::Error;

/// Common error type for uptree.
#[derive(Error, Debug)]
pub enum UptreeError {
    /// No entries were selected for staging or submission.
    #[error("nothing selected")]
    EmptySelection,

    /// Aggregate upload size is over the configured cap.
    #[error("upload size {total} bytes exceeds limit of {limit} bytes")]
    SizeLimitExceeded {
        /// Total size of the staged upload.
        total: u64,
        /// Configured maximum.
        limit: u64,
    },

    /// A navigation call violated its contract.
    ///
    /// These are caller bugs (descending into an empty list, ascending to a
    /// breadcrumb that does not exist), not user-facing failures.
    #[error("navigation precondition violated: {0}")]
    NavigationPrecondition(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error for collaborator input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for uptree operations.
pub type Result<T> = std::result::Result<T, UptreeError>;
