//! Inventory Tracker
//!
//! Orchestration layer over the storage crate: an explicit [`AppState`],
//! a [`Controller`] that turns user gestures into validated storage calls,
//! and the command-line front end.

pub mod cli;
mod controller;
mod error;
mod settings;
mod state;

pub use controller::{Controller, DeployOutcome, ItemForm};
pub use error::AppError;
pub use settings::{DeployPolicy, LogFormat, Settings};
pub use state::AppState;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging on stderr, keeping stdout for command output
pub fn init_logging(settings: &Settings) -> Result<(), AppError> {
    let level: Level = settings
        .log_level
        .parse()
        .map_err(|_| AppError::Logging(format!("unknown log level {:?}", settings.log_level)))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = match settings.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };

    result.map_err(|e| AppError::Logging(e.to_string()))
}
