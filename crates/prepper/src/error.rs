//! Error types for the prepper library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for prepper operations.
///
/// Every failure leaves the workspace in its last successful state; callers
/// surface the message and decide whether to retry.
#[derive(Debug, Error)]
pub enum PrepError {
    /// The analysis service rejected the dataset (e.g. unparseable format).
    #[error("Failed to create session for '{dataset}': {message}")]
    SessionCreation { dataset: String, message: String },

    /// Client-side contract violation; never sent to the service.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The service rejected a well-formed transformation.
    #[error("Transformation failed: {0}")]
    Transformation(String),

    /// There is no transformation left to undo.
    #[error("Nothing to undo: {0}")]
    NothingToUndo(String),

    /// A row in a service response does not match the column count.
    #[error("Shape mismatch at row {row}: expected {expected} values, found {found}")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A recommendation could not be mapped to a transformation.
    #[error("No transformation matches recommendation: {0}")]
    UnmappableRecommendation(String),

    /// Transport or protocol failure talking to the analysis service.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to work with.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to save or load a file.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PrepError::SessionCreation { .. } => "session_creation",
            PrepError::InvalidRequest(_) => "invalid_request",
            PrepError::Transformation(_) => "transformation",
            PrepError::NothingToUndo(_) => "nothing_to_undo",
            PrepError::ShapeMismatch { .. } => "shape_mismatch",
            PrepError::UnmappableRecommendation(_) => "unmappable_recommendation",
            PrepError::Backend(_) => "backend",
            PrepError::Io { .. } => "io",
            PrepError::Csv(_) => "csv",
            PrepError::EmptyData(_) => "empty_data",
            PrepError::Config(_) => "config",
            PrepError::Persistence(_) => "persistence",
            PrepError::Json(_) => "json",
        }
    }
}

/// Result type alias for prepper operations.
pub type Result<T> = std::result::Result<T, PrepError>;
