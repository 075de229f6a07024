//! Record Types

use serde::{Deserialize, Serialize};

/// A physical place where stock is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: String,
    pub name: String,
}

/// Inventory item joined with its location's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub count: i64,
    /// Eligible for the bulk deploy workflow
    pub deployable: bool,
    /// Low-stock threshold; `None` means "low only when empty"
    pub low_count: Option<i64>,
    pub location_id: String,
    pub location_name: String,
}

impl InventoryItem {
    /// Whether the item has reached its low-stock threshold
    pub fn is_low(&self) -> bool {
        match self.low_count {
            Some(threshold) => self.count <= threshold,
            None => self.count == 0,
        }
    }
}

/// Per-location item count and total quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LocationSummary {
    pub location_id: String,
    pub name: String,
    /// Number of distinct items
    pub item_count: i64,
    /// Sum of item counts
    pub total_count: i64,
}

/// Payload for creating an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub count: i64,
    pub location_id: String,
    pub deployable: bool,
    pub low_count: Option<i64>,
}

/// Full overwrite of an item's editable fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub count: i64,
    pub location_id: String,
    pub deployable: bool,
    pub low_count: Option<i64>,
}

/// Item listing filter. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFilter {
    /// Exact location identifier
    pub location_id: Option<String>,
    /// Case-insensitive substring of the item name
    pub search: Option<String>,
}

impl ItemFilter {
    /// Filter matching every item
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = if search.is_empty() { None } else { Some(search) };
        self
    }
}

/// One line of a batch deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub item_id: i64,
    pub quantity: i64,
}

impl Deployment {
    pub fn new(item_id: i64, quantity: i64) -> Self {
        Self { item_id, quantity }
    }
}
