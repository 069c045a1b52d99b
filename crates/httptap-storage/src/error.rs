//! Store error types

use std::path::PathBuf;

use httptap_models::RecordError;
use thiserror::Error;

/// A single file that could not be removed during a namespace clear.
#[derive(Debug)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage unavailable at {}: {source}", .path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write record {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read logs directory {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to delete {} record file(s), first: {}", .failures.len(), describe_first(.failures))]
    DeleteFailed { failures: Vec<DeleteFailure> },

    #[error(transparent)]
    Encode(#[from] RecordError),
}

fn describe_first(failures: &[DeleteFailure]) -> String {
    failures
        .first()
        .map(|failure| format!("{}: {}", failure.path.display(), failure.source))
        .unwrap_or_default()
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
