//! Application Error Types

use data_validator::ValidationError;
use export::ExportError;
use storage::StorageError;
use thiserror::Error;

/// Errors surfaced to the user by the orchestration layer
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected form input; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("No item selected")]
    NoSelection,

    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("Location {0:?} not found")]
    LocationNotFound(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
