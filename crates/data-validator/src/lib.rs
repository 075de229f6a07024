//! Input Validation
//!
//! Turns raw form values (names, counts, location choices, deploy carts)
//! into checked values before anything reaches the storage layer.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{DeployRequest, StockLevel, ValidationConfig, Validator};
