use anyhow::{Context, Result};
use football_calendars::config::Config;
use football_calendars::run_default_calendars;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Scheduled job entry point: builds every calendar once and exits.
/// The triggering event (first argument or `CALENDAR_EVENT`) is only logged.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let raw_event = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CALENDAR_EVENT").ok())
        .unwrap_or_else(|| "{}".to_string());
    let event: serde_json::Value =
        serde_json::from_str(&raw_event).unwrap_or(serde_json::Value::String(raw_event));
    info!(%event, "Received event");

    let config = Config::from_env().context("Failed to load configuration")?;
    let summaries = run_default_calendars(&config).await?;

    for summary in &summaries {
        info!(
            calendar = %summary.name,
            key = %summary.key,
            events = summary.events,
            published = summary.published,
            "Calendar done"
        );
    }
    info!(calendars = summaries.len(), "Success");

    Ok(())
}
