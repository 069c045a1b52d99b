//! Error types for the record model

use thiserror::Error;

/// Record (de)serialization errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}
