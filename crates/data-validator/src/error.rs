//! Validation Error Types

use thiserror::Error;

/// Errors raised while checking user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name was empty after trimming
    #[error("Please enter an item name")]
    EmptyName,

    #[error("Name is {len} characters long, the limit is {max}")]
    NameTooLong { len: usize, max: usize },

    /// Value did not parse as an integer
    #[error("Please enter a valid number for {field} (got {value:?})")]
    NotANumber { field: &'static str, value: String },

    #[error("Please enter a valid {field} (0 or greater), got {value}")]
    NegativeCount { field: &'static str, value: i64 },

    /// Location choice did not match any known location
    #[error("Please select a location (unknown location {0:?})")]
    UnknownLocation(String),

    #[error("Item {0} is not available to deploy")]
    UnknownItem(i64),

    #[error("Cannot deploy {requested} of '{name}'. Only {available} available.")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: i64,
    },

    #[error("Please select at least one item to deploy")]
    NothingToDeploy,
}
