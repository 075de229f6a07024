//! Storage Layer
//!
//! SQLite persistence for locations and inventory items. Every operation
//! opens its own connection, runs a statement (or a short fixed sequence),
//! commits and closes. Nothing is cached between calls.

mod models;
mod repository;
mod schema;
mod summary;

pub use models::{
    Deployment, InventoryItem, ItemFilter, ItemUpdate, Location, LocationSummary, NewItem,
};
pub use repository::Repository;
pub use schema::{SEED_ITEMS, SEED_LOCATIONS};
pub use summary::{low_items, summarize_low_items};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A location cannot be removed while items still reference it
    #[error("Cannot delete location {location_id}: {item_count} item(s) still assigned to it")]
    LocationInUse { location_id: String, item_count: i64 },

    /// Strict deploy found a row without enough stock
    #[error("Insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: i64,
        requested: i64,
        available: i64,
    },

    /// Strict deploy referenced an item that does not exist
    #[error("Item {0} not found")]
    ItemNotFound(i64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
