//! Application State

use serde::Serialize;
use storage::{InventoryItem, ItemFilter, Location, LocationSummary};

/// Everything the presentation layer shows, owned in one place.
///
/// The lists are re-queried after every mutation, never patched in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AppState {
    /// Item open in the editor
    pub selected_item: Option<i64>,
    /// Pending count in the editor, committed with `commit_count`
    pub draft_count: Option<i64>,
    /// Location id the item list is restricted to
    pub location_filter: Option<String>,
    pub search_text: String,

    pub locations: Vec<Location>,
    pub items: Vec<InventoryItem>,
    pub summary: Vec<LocationSummary>,
    pub low_summary: Vec<LocationSummary>,
}

impl AppState {
    /// Filter for the item list as currently configured
    pub fn filter(&self) -> ItemFilter {
        let mut filter = ItemFilter::all().with_search(self.search_text.clone());
        filter.location_id = self.location_filter.clone();
        filter
    }

    /// The selected item, if it is in the current list
    pub fn selected(&self) -> Option<&InventoryItem> {
        let id = self.selected_item?;
        self.items.iter().find(|item| item.id == id)
    }

    /// `(id, name)` pairs for location pickers
    pub fn location_choices(&self) -> impl Iterator<Item = (&str, &str)> {
        self.locations
            .iter()
            .map(|loc| (loc.id.as_str(), loc.name.as_str()))
    }

    /// Look a location up by id first, then by display name
    pub fn find_location(&self, key: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|loc| loc.id == key)
            .or_else(|| self.locations.iter().find(|loc| loc.name == key))
    }

    pub fn clear_selection(&mut self) {
        self.selected_item = None;
        self.draft_count = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: &str, name: &str) -> Location {
        Location {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_filter_reflects_state() {
        let mut state = AppState::default();
        assert_eq!(state.filter(), ItemFilter::all());

        state.location_filter = Some("lab1".to_string());
        state.search_text = "cable".to_string();
        let filter = state.filter();
        assert_eq!(filter.location_id.as_deref(), Some("lab1"));
        assert_eq!(filter.search.as_deref(), Some("cable"));
    }

    #[test]
    fn test_find_location_prefers_id() {
        let mut state = AppState::default();
        state.locations = vec![location("a1", "Annex"), location("Annex", "Basement")];

        assert_eq!(state.find_location("Annex").unwrap().name, "Basement");
        assert_eq!(state.find_location("Basement").unwrap().id, "Annex");
        assert!(state.find_location("Roof").is_none());
    }

    #[test]
    fn test_clear_selection() {
        let mut state = AppState {
            selected_item: Some(4),
            draft_count: Some(2),
            ..Default::default()
        };
        state.clear_selection();
        assert!(state.selected_item.is_none());
        assert!(state.draft_count.is_none());
    }
}
