//! Error types for the inventory module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur while loading inventories and run configuration.
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid record #{index} in inventory: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("Duplicate resource id in inventory: {0}")]
    DuplicateId(String),

    #[error("Invalid run configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
