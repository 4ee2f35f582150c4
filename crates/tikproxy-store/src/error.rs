//! Storage error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during artifact store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create storage root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
