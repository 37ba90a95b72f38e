//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors that abort a cleanup run.
///
/// Per-resource deletion failures are not represented here: they are
/// logged by the worker and the resource stays pending.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Scan failed for resource type {resource_type}: {message}")]
    ScanFailed {
        resource_type: String,
        message: String,
    },

    #[error("No deleter registered for resource type: {0}")]
    MissingDeleter(String),

    #[error("Resource {resource_id} still failing after {attempts} attempts: {message}")]
    RetriesExhausted {
        resource_id: String,
        attempts: u32,
        message: String,
    },

    #[error("No remaining resource can be deleted: {0:?}")]
    Unresolvable(Vec<String>),

    #[error("Deletion worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SweepError {
    /// Whether this error means the run could not make structural sense of
    /// its work (as opposed to a configured retry cap being hit).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SweepError::ScanFailed { .. }
                | SweepError::MissingDeleter(_)
                | SweepError::Unresolvable(_)
                | SweepError::WorkerPanicked(_)
        )
    }
}
