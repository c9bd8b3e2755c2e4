//! Error types for the pushgate metric store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced while building label sets or parsing pushed bodies.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid label name {0:?}")]
    InvalidLabelName(String),

    #[error("{0}")]
    Parse(String),
}
