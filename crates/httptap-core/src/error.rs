//! Error types for the recording client

use httptap_storage::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("failed to initialize storage: {0}")]
    Storage(#[from] StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for client setup and configuration
pub type Result<T> = std::result::Result<T, CoreError>;
