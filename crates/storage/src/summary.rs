//! Low-Stock Aggregation

use crate::models::{InventoryItem, LocationSummary};
use std::collections::HashMap;

/// Items that have reached their low-stock threshold
pub fn low_items(items: Vec<InventoryItem>) -> Vec<InventoryItem> {
    items.into_iter().filter(InventoryItem::is_low).collect()
}

/// Group low items by location, sorted by location name.
///
/// Locations without a qualifying item do not appear in the output.
pub fn summarize_low_items(items: &[InventoryItem]) -> Vec<LocationSummary> {
    let mut groups: HashMap<&str, LocationSummary> = HashMap::new();

    for item in items.iter().filter(|item| item.is_low()) {
        let entry = groups
            .entry(item.location_id.as_str())
            .or_insert_with(|| LocationSummary {
                location_id: item.location_id.clone(),
                name: item.location_name.clone(),
                item_count: 0,
                total_count: 0,
            });
        entry.item_count += 1;
        entry.total_count += item.count;
    }

    let mut summary: Vec<_> = groups.into_values().collect();
    summary.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.location_id.cmp(&b.location_id))
    });
    summary
}
