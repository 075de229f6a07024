//! Controller
//!
//! One method per user gesture. Mutations follow the same path: validate
//! input, call the repository, then re-query everything shown.

use crate::{AppError, AppState, DeployPolicy, Settings};
use chrono::Local;
use data_validator::{DeployRequest, StockLevel, ValidationConfig, Validator};
use export::{default_export_path, export_items, ExportSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use storage::{Deployment, InventoryItem, ItemFilter, ItemUpdate, NewItem, Repository};
use tracing::{debug, info};

/// Raw values from the add/edit item form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub name: String,
    pub count: String,
    /// Location display name as picked by the user
    pub location: String,
    /// Location the item is already in; kept while `location` still names it
    pub location_id: Option<String>,
    pub deployable: bool,
    /// Blank means no threshold
    pub low_count: String,
}

impl ItemForm {
    /// Form pre-filled with an item's current values
    pub fn from_item(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            count: item.count.to_string(),
            location: item.location_name.clone(),
            location_id: Some(item.location_id.clone()),
            deployable: item.deployable,
            low_count: item.low_count.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

/// Result of a batch deploy
#[derive(Debug, Clone, Serialize)]
pub struct DeployOutcome {
    pub lines: Vec<Deployment>,
    pub total_quantity: i64,
    pub rows_updated: u64,
}

/// Orchestrates validation, storage calls and state refreshes
pub struct Controller {
    repo: Repository,
    validator: Validator,
    policy: DeployPolicy,
    export_dir: PathBuf,
    state: AppState,
}

impl Controller {
    /// Open the configured database and load the initial state
    pub async fn open(settings: &Settings) -> Result<Self, AppError> {
        let repo = Repository::open(&settings.database_path).await?;
        Self::with_repository(repo, settings).await
    }

    pub async fn with_repository(repo: Repository, settings: &Settings) -> Result<Self, AppError> {
        let validator = Validator::new(ValidationConfig {
            max_name_len: settings.max_name_len,
        });

        let mut controller = Self {
            repo,
            validator,
            policy: settings.deploy_policy,
            export_dir: settings.export_dir.clone(),
            state: AppState::default(),
        };
        controller.refresh().await?;
        Ok(controller)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Re-query locations, the filtered item list and both summaries
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.state.locations = self.repo.list_locations().await?;

        let filter_gone = match &self.state.location_filter {
            Some(id) => !self.state.locations.iter().any(|loc| &loc.id == id),
            None => false,
        };
        if filter_gone {
            self.state.location_filter = None;
        }

        if let Some(id) = self.state.selected_item {
            if self.repo.get_item(id).await?.is_none() {
                self.state.clear_selection();
            }
        }

        self.state.items = self.repo.list_items(&self.state.filter()).await?;
        self.state.summary = self.repo.location_summary().await?;
        self.state.low_summary = self.repo.low_item_location_summary().await?;

        debug!(
            items = self.state.items.len(),
            locations = self.state.locations.len(),
            "State refreshed"
        );
        Ok(())
    }

    // ----- Filtering -----

    /// Restrict the list to one location (by id or name); `None` shows all
    pub async fn set_location_filter(&mut self, location: Option<&str>) -> Result<(), AppError> {
        self.state.location_filter = match location {
            Some(key) => Some(self.location_id(key)?),
            None => None,
        };
        self.refresh().await
    }

    pub async fn set_search(&mut self, text: &str) -> Result<(), AppError> {
        self.state.search_text = text.trim().to_string();
        self.refresh().await
    }

    // ----- Editor -----

    /// Open an item in the editor, resetting the draft count
    pub async fn select_item(&mut self, item_id: i64) -> Result<InventoryItem, AppError> {
        let item = self
            .repo
            .get_item(item_id)
            .await?
            .ok_or(AppError::ItemNotFound(item_id))?;

        self.state.selected_item = Some(item.id);
        self.state.draft_count = Some(item.count);
        Ok(item)
    }

    /// Close the editor, discarding any draft
    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    pub fn increment_draft(&mut self) -> Result<i64, AppError> {
        self.step_draft(1)
    }

    /// Lower the draft by one, never below zero
    pub fn decrement_draft(&mut self) -> Result<i64, AppError> {
        self.step_draft(-1)
    }

    /// Move the draft by `delta` in one step, never below zero
    pub fn step_draft(&mut self, delta: i64) -> Result<i64, AppError> {
        let draft = self.draft()?.saturating_add(delta).max(0);
        self.state.draft_count = Some(draft);
        Ok(draft)
    }

    /// Replace the draft with a typed value
    pub fn set_draft(&mut self, raw: &str) -> Result<i64, AppError> {
        self.selected_id()?;
        let draft = self.validator.parse_count("count", raw)?;
        self.state.draft_count = Some(draft);
        Ok(draft)
    }

    /// Write the draft count to the selected item
    pub async fn commit_count(&mut self) -> Result<InventoryItem, AppError> {
        let item_id = self.selected_id()?;
        let draft = self.draft()?;

        if !self.repo.set_item_count(item_id, draft).await? {
            self.state.clear_selection();
            return Err(AppError::ItemNotFound(item_id));
        }

        info!(item_id, count = draft, "Item count updated");
        self.refresh().await?;
        self.select_item(item_id).await
    }

    // ----- Items -----

    /// Validate the add form and create the item
    pub async fn add_item(&mut self, form: &ItemForm) -> Result<i64, AppError> {
        let item = NewItem {
            name: self.validator.validate_name(&form.name)?,
            count: self.validator.parse_count("count", &form.count)?,
            location_id: self.form_location(form)?,
            deployable: form.deployable,
            low_count: self.validator.parse_low_count(&form.low_count)?,
        };

        let id = self.repo.create_item(&item).await?;
        self.refresh().await?;
        Ok(id)
    }

    /// Validate the edit form and overwrite the selected item
    pub async fn edit_item(&mut self, form: &ItemForm) -> Result<InventoryItem, AppError> {
        let item_id = self.selected_id()?;
        let update = ItemUpdate {
            name: self.validator.validate_name(&form.name)?,
            count: self.validator.parse_count("count", &form.count)?,
            location_id: self.form_location(form)?,
            deployable: form.deployable,
            low_count: self.validator.parse_low_count(&form.low_count)?,
        };

        if !self.repo.update_item(item_id, &update).await? {
            self.state.clear_selection();
            return Err(AppError::ItemNotFound(item_id));
        }

        info!(item_id, "Item edited");
        self.refresh().await?;
        self.select_item(item_id).await
    }

    /// Delete the selected item and close the editor
    pub async fn delete_selected(&mut self) -> Result<InventoryItem, AppError> {
        let item_id = self.selected_id()?;
        let item = self
            .repo
            .get_item(item_id)
            .await?
            .ok_or(AppError::ItemNotFound(item_id))?;

        self.repo.delete_item(item_id).await?;
        info!(item_id, "Removed {:?} from inventory", item.name);

        self.state.clear_selection();
        self.refresh().await?;
        Ok(item)
    }

    // ----- Deploy -----

    /// Items offered in the deploy cart
    pub async fn deploy_candidates(&self) -> Result<Vec<InventoryItem>, AppError> {
        let items = self.repo.list_items(&ItemFilter::all()).await?;
        Ok(items.into_iter().filter(|item| item.deployable).collect())
    }

    /// Check the cart against current stock, then deploy it as one batch
    pub async fn deploy(&mut self, cart: &[DeployRequest]) -> Result<DeployOutcome, AppError> {
        let stock: Vec<StockLevel> = self
            .deploy_candidates()
            .await?
            .into_iter()
            .map(|item| StockLevel {
                item_id: item.id,
                name: item.name,
                available: item.count,
            })
            .collect();

        let lines: Vec<Deployment> = self
            .validator
            .validate_deployment(cart, &stock)?
            .into_iter()
            .map(|(item_id, quantity)| Deployment::new(item_id, quantity))
            .collect();

        let rows_updated = match self.policy {
            DeployPolicy::Clamp => self.repo.deploy_items(&lines).await?,
            DeployPolicy::Strict => self.repo.deploy_items_strict(&lines).await?,
        };

        let total_quantity = lines.iter().map(|line| line.quantity).sum();
        info!(total_quantity, "Deployed {} cart line(s)", lines.len());

        self.refresh().await?;
        if let Some(item_id) = self.state.selected_item {
            self.select_item(item_id).await?;
        }

        Ok(DeployOutcome {
            lines,
            total_quantity,
            rows_updated,
        })
    }

    // ----- Locations -----

    pub async fn add_location(&mut self, name: &str) -> Result<String, AppError> {
        let name = self.validator.validate_name(name)?;
        let id = self.repo.create_location(&name).await?;
        self.refresh().await?;
        Ok(id)
    }

    /// Rename a location given by id or current name
    pub async fn rename_location(&mut self, location: &str, name: &str) -> Result<(), AppError> {
        let location_id = self.location_id(location)?;
        let name = self.validator.validate_name(name)?;

        if !self.repo.rename_location(&location_id, &name).await? {
            return Err(AppError::LocationNotFound(location.to_string()));
        }
        self.refresh().await
    }

    /// Delete an empty location given by id or name
    pub async fn delete_location(&mut self, location: &str) -> Result<(), AppError> {
        let location_id = self.location_id(location)?;
        self.repo.delete_location(&location_id).await?;
        self.refresh().await
    }

    // ----- Export -----

    /// Export every item; without a path, a dated file in the export directory
    pub async fn export(&self, path: Option<&Path>) -> Result<ExportSummary, AppError> {
        let items = self.repo.list_items(&ItemFilter::all()).await?;
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_export_path(&self.export_dir, Local::now().date_naive()),
        };
        Ok(export_items(&items, &path)?)
    }

    // ----- Helpers -----

    fn selected_id(&self) -> Result<i64, AppError> {
        self.state.selected_item.ok_or(AppError::NoSelection)
    }

    fn draft(&self) -> Result<i64, AppError> {
        self.selected_id()?;
        self.state.draft_count.ok_or(AppError::NoSelection)
    }

    /// Keep the form's current location unless the picked name changed
    fn form_location(&self, form: &ItemForm) -> Result<String, AppError> {
        let current = form
            .location_id
            .as_deref()
            .and_then(|id| self.state.locations.iter().find(|loc| loc.id == id));

        match current {
            Some(loc) if loc.name == form.location.trim() => Ok(loc.id.clone()),
            _ => self.resolve_location(&form.location),
        }
    }

    /// Location picker value to id, reported as a validation failure
    fn resolve_location(&self, name: &str) -> Result<String, AppError> {
        let id = self
            .validator
            .resolve_location(name.trim(), self.state.location_choices())?;
        Ok(id.to_string())
    }

    fn location_id(&self, key: &str) -> Result<String, AppError> {
        self.state
            .find_location(key)
            .map(|loc| loc.id.clone())
            .ok_or_else(|| AppError::LocationNotFound(key.to_string()))
    }
}
