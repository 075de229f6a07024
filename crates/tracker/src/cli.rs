//! Command-Line Front End
//!
//! Each subcommand drives the [`Controller`] exactly as the matching form
//! or button would, then renders the result as text or JSON.

use crate::{AppError, Controller, ItemForm};
use clap::{Args, Parser, Subcommand};
use data_validator::DeployRequest;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use storage::{InventoryItem, Location, LocationSummary};

#[derive(Debug, Parser)]
#[command(name = "inventory-tracker")]
#[command(about = "Track IT equipment stock across help desk, storage, labs and server room")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./inventory.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides the configured path
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List items, optionally filtered by location and name
    List {
        /// Location name or id
        #[arg(long)]
        location: Option<String>,

        /// Case-insensitive part of the item name
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Show one item
    Show { id: i64 },

    /// Add a new item
    Add {
        name: String,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        count: String,

        /// Location name
        #[arg(long)]
        location: String,

        /// Offer the item in deploy carts
        #[arg(long)]
        deployable: bool,

        /// Low-stock threshold (blank for none)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        low_count: String,
    },

    /// Edit an item; omitted fields keep their current value
    Edit(EditArgs),

    /// Overwrite an item's count
    SetCount {
        id: i64,
        #[arg(allow_hyphen_values = true)]
        count: String,
    },

    /// Raise an item's count
    Inc {
        id: i64,
        #[arg(long, default_value_t = 1)]
        by: u32,
    },

    /// Lower an item's count (never below zero)
    Dec {
        id: i64,
        #[arg(long, default_value_t = 1)]
        by: u32,
    },

    /// Remove an item
    Delete { id: i64 },

    /// Deploy a batch of items, given as ID=QTY pairs
    Deploy {
        #[arg(required = true, value_parser = parse_cart_line)]
        lines: Vec<DeployRequest>,
    },

    /// List items that can be deployed
    Candidates,

    /// Per-location totals
    Summary {
        /// Only count low-stock items
        #[arg(long)]
        low: bool,
    },

    /// List low-stock items
    Low,

    /// Manage locations
    #[command(subcommand)]
    Locations(LocationCommand),

    /// Write all items to a spreadsheet (.xlsx, or .csv by extension)
    Export { path: Option<PathBuf> },
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub count: Option<String>,

    /// Location name
    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub deployable: Option<bool>,

    #[arg(long, allow_hyphen_values = true, conflicts_with = "clear_low_count")]
    pub low_count: Option<String>,

    /// Remove the low-stock threshold
    #[arg(long)]
    pub clear_low_count: bool,
}

#[derive(Debug, Subcommand)]
pub enum LocationCommand {
    /// List locations
    List,
    /// Add a location
    Add { name: String },
    /// Rename a location given by name or id
    Rename { location: String, name: String },
    /// Delete an empty location given by name or id
    Delete { location: String },
}

/// Parse a cart line of the form `ID=QTY`
fn parse_cart_line(raw: &str) -> Result<DeployRequest, String> {
    let (id, quantity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=QTY, got {:?}", raw))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid item id {:?}", id))?;
    Ok(DeployRequest::new(id, quantity.trim()))
}

/// Run one command and return what should be printed
pub async fn execute(
    command: &Command,
    controller: &mut Controller,
    as_json: bool,
) -> Result<String, AppError> {
    match command {
        Command::List { location, search } => {
            controller.set_location_filter(location.as_deref()).await?;
            controller.set_search(search).await?;
            render(as_json, &controller.state().items, |items| render_items(items))
        }

        Command::Show { id } => {
            let item = controller.select_item(*id).await?;
            render(as_json, &item, render_item)
        }

        Command::Add {
            name,
            count,
            location,
            deployable,
            low_count,
        } => {
            let form = ItemForm {
                name: name.clone(),
                count: count.clone(),
                location: location.clone(),
                location_id: None,
                deployable: *deployable,
                low_count: low_count.clone(),
            };
            let id = controller.add_item(&form).await?;
            render(as_json, &json!({ "id": id }), |_| {
                format!("Added \"{}\" to inventory (id {})", form.name.trim(), id)
            })
        }

        Command::Edit(args) => {
            let current = controller.select_item(args.id).await?;
            let mut form = ItemForm::from_item(&current);
            if let Some(name) = &args.name {
                form.name = name.clone();
            }
            if let Some(count) = &args.count {
                form.count = count.clone();
            }
            if let Some(location) = &args.location {
                form.location = location.clone();
            }
            if let Some(deployable) = args.deployable {
                form.deployable = deployable;
            }
            if let Some(low_count) = &args.low_count {
                form.low_count = low_count.clone();
            }
            if args.clear_low_count {
                form.low_count.clear();
            }

            let item = controller.edit_item(&form).await?;
            render(as_json, &item, render_item)
        }

        Command::SetCount { id, count } => {
            controller.select_item(*id).await?;
            controller.set_draft(count)?;
            let item = controller.commit_count().await?;
            render(as_json, &item, count_updated)
        }

        Command::Inc { id, by } => {
            controller.select_item(*id).await?;
            controller.step_draft(i64::from(*by))?;
            let item = controller.commit_count().await?;
            render(as_json, &item, count_updated)
        }

        Command::Dec { id, by } => {
            controller.select_item(*id).await?;
            controller.step_draft(-i64::from(*by))?;
            let item = controller.commit_count().await?;
            render(as_json, &item, count_updated)
        }

        Command::Delete { id } => {
            controller.select_item(*id).await?;
            let item = controller.delete_selected().await?;
            render(as_json, &item, |item| {
                format!("\"{}\" has been removed from inventory.", item.name)
            })
        }

        Command::Deploy { lines } => {
            let outcome = controller.deploy(lines).await?;
            render(as_json, &outcome, |outcome| {
                format!("Computer deployed with {} items!", outcome.total_quantity)
            })
        }

        Command::Candidates => {
            let items = controller.deploy_candidates().await?;
            render(as_json, &items, |items| render_items(items))
        }

        Command::Summary { low } => {
            let summary = if *low {
                &controller.state().low_summary
            } else {
                &controller.state().summary
            };
            render(as_json, summary, |summary| render_summary(summary))
        }

        Command::Low => {
            let items = controller.repository().low_items().await?;
            render(as_json, &items, |items| render_items(items))
        }

        Command::Locations(LocationCommand::List) => {
            render(as_json, &controller.state().locations, |locations| {
                render_locations(locations)
            })
        }

        Command::Locations(LocationCommand::Add { name }) => {
            let id = controller.add_location(name).await?;
            render(as_json, &json!({ "id": id }), |_| {
                format!("Added location \"{}\" ({})", name.trim(), id)
            })
        }

        Command::Locations(LocationCommand::Rename { location, name }) => {
            controller.rename_location(location, name).await?;
            Ok(format!("Renamed location \"{}\" to \"{}\"", location, name.trim()))
        }

        Command::Locations(LocationCommand::Delete { location }) => {
            controller.delete_location(location).await?;
            Ok(format!("Deleted location \"{}\"", location))
        }

        Command::Export { path } => {
            let summary = controller.export(path.as_deref()).await?;
            render(as_json, &summary, |summary| {
                format!(
                    "Exported {} items to {}",
                    summary.rows,
                    summary.path.display()
                )
            })
        }
    }
}

fn render<T, F>(as_json: bool, value: &T, text: F) -> Result<String, AppError>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    if as_json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(text(value))
    }
}

fn count_updated(item: &InventoryItem) -> String {
    format!("Item count updated: {} = {}", item.name, item.count)
}

fn render_item(item: &InventoryItem) -> String {
    let threshold = match item.low_count {
        Some(low) => low.to_string(),
        None => "-".to_string(),
    };
    format!(
        "#{} {}\n  count:      {}{}\n  location:   {} ({})\n  deployable: {}\n  low count:  {}",
        item.id,
        item.name,
        item.count,
        if item.is_low() { "  (low)" } else { "" },
        item.location_name,
        item.location_id,
        if item.deployable { "yes" } else { "no" },
        threshold
    )
}

fn render_items(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "No items found.".to_string();
    }

    let header = format!("{:>5}  {:<36} {:>6}  {}", "ID", "NAME", "COUNT", "LOCATION");
    std::iter::once(header)
        .chain(items.iter().map(|item| {
            format!(
                "{:>5}  {:<36} {:>6}  {}",
                item.id, item.name, item.count, item.location_name
            )
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_summary(summary: &[LocationSummary]) -> String {
    if summary.is_empty() {
        return "Nothing to report.".to_string();
    }

    summary
        .iter()
        .map(|row| {
            format!(
                "{:<24} {:>6} total  {} items",
                row.name, row.total_count, row.item_count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_locations(locations: &[Location]) -> String {
    locations
        .iter()
        .map(|loc| format!("{:<24} {}", loc.name, loc.id))
        .collect::<Vec<_>>()
        .join("\n")
}
