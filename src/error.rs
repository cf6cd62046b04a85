//! Error handling for fundwatch
//!
//! Defines the fund error taxonomy shared by the fetch adapter, the stores
//! and the CLI, and establishes a unified Result type using anyhow for
//! context chaining and error propagation.

use std::time::Duration;
use thiserror::Error;

/// Core error types for fund operations
#[derive(Error, Debug)]
pub enum FundError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("fund not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl FundError {
    /// True when the payload arrived but carried nothing usable.
    pub fn is_missing_data(&self) -> bool {
        matches!(self, FundError::EmptyData(_) | FundError::NotFound(_))
    }
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;
