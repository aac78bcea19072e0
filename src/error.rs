use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tools ingest, reshape, or emit data.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization of the stats summary fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a table contains no period-formatted column and the
    /// banner reshaping therefore has nothing to pivot on.
    #[error("no period column found in the input header")]
    NoPeriodColumn,

    /// Raised when a required column is absent from the input header.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// Raised when a priority file cannot be used.
    #[error("invalid priority file {path}: {reason}")]
    InvalidPriorityFile { path: PathBuf, reason: String },

    /// Raised when an input file has no usable name component.
    #[error("cannot derive an output name from {0}")]
    UnnamedInput(PathBuf),
}
