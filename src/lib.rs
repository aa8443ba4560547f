pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod publisher;
pub mod scrapers;
pub mod utils;

pub use api::*;
pub use models::*;
pub use scrapers::*;
pub use utils::*;

use anyhow::{Context, Result};
use config::Config;
use pipeline::{default_calendars, Orchestrator, RunSummary};
use publisher::Publisher;
use std::sync::Arc;

/// Wire the configured page source and store into an orchestrator
pub async fn orchestrator_from_config(config: &Config) -> Result<Orchestrator> {
    let source = config
        .page_source()
        .context("Failed to create HTTP client")?;
    let store = config.store().await;

    Ok(Orchestrator::new(
        Arc::new(source),
        Publisher::new(store),
        config.fetch_concurrency,
    ))
}

/// Build and publish every default calendar, one after another
pub async fn run_default_calendars(config: &Config) -> Result<Vec<RunSummary>> {
    let orchestrator = orchestrator_from_config(config).await?;
    let calendars = default_calendars(config);

    orchestrator
        .run_all(&calendars)
        .await
        .context("Calendar run aborted")
}
