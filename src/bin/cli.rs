use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use football_calendars::api::{CalendarStore, MemoryStore};
use football_calendars::config::Config;
use football_calendars::data::{load_games_from_json, save_games_to_csv, save_games_to_json};
use football_calendars::pipeline::{
    default_calendars, find_calendar, publish_games, CalendarPipeline, Orchestrator, RunSummary,
};
use football_calendars::publisher::Publisher;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cli", about = "Build football schedule calendars from ESPN")]
struct Cli {
    /// Print calendars to stdout instead of publishing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Publish into this directory instead of the configured store
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and publish every calendar
    Run,
    /// Build and publish one calendar by name or slug
    Build { name: String },
    /// List the calendars a run would build
    List,
    /// Scrape one calendar's games and export them
    Scrape {
        name: String,
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        json: Option<PathBuf>,
    },
    /// Publish one calendar from games saved with `scrape --json`
    Publish {
        name: String,
        #[arg(long, value_name = "PATH")]
        from_json: PathBuf,
    },
}

fn lookup_calendar(calendars: &[CalendarPipeline], name: &str) -> Result<CalendarPipeline> {
    match find_calendar(calendars, name) {
        Some(calendar) => Ok(calendar.clone()),
        None => bail!("Unknown calendar '{}'. Try `cli list`.", name),
    }
}

/// The dry-run buffer, or the configured store
async fn calendar_store(
    config: &Config,
    dry_run: bool,
    memory: &Arc<MemoryStore>,
) -> Arc<dyn CalendarStore> {
    if dry_run {
        memory.clone()
    } else {
        config.store().await
    }
}

async fn build_orchestrator(
    config: &Config,
    dry_run: bool,
    memory: &Arc<MemoryStore>,
) -> Result<Orchestrator> {
    let source = config.page_source().context("Failed to create HTTP client")?;
    let store = calendar_store(config, dry_run, memory).await;
    Ok(Orchestrator::new(
        Arc::new(source),
        Publisher::new(store),
        config.fetch_concurrency,
    ))
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{}: {} events -> {}{}",
        summary.name,
        summary.events,
        summary.key,
        if summary.published { "" } else { " (publish failed)" }
    );
}

fn print_documents(store: &MemoryStore) -> Result<()> {
    for (key, body) in store.objects() {
        println!("# {}", key);
        println!("{}", String::from_utf8(body).context("Calendar is not UTF-8")?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging (stderr, so dry runs can be piped)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = Some(dir);
    }

    let calendars = default_calendars(&config);

    let memory = Arc::new(MemoryStore::new());

    match cli.command {
        Command::List => {
            for calendar in &calendars {
                println!(
                    "{:<36} {:<16} {:?}  {}",
                    calendar.name,
                    calendar.slug(),
                    calendar.filter,
                    calendar.listing_url()
                );
            }
        }
        Command::Run => {
            let orchestrator = build_orchestrator(&config, cli.dry_run, &memory).await?;
            let summaries = orchestrator.run_all(&calendars).await?;
            summaries.iter().for_each(print_summary);
        }
        Command::Build { name } => {
            let calendar = lookup_calendar(&calendars, &name)?;
            let orchestrator = build_orchestrator(&config, cli.dry_run, &memory).await?;
            let summary = orchestrator.run_pipeline(&calendar).await?;
            print_summary(&summary);
        }
        Command::Scrape { name, csv, json } => {
            let calendar = lookup_calendar(&calendars, &name)?;
            // Scraping never publishes, so the store is never touched
            let orchestrator = build_orchestrator(&config, true, &memory).await?;
            let games = orchestrator.collect_games(&calendar).await?;

            for game in &games {
                println!(
                    "{:>10}  {:<28} {} at {}",
                    game.id,
                    game.kickoff.to_string(),
                    game.visitor.name,
                    game.home.name
                );
            }
            if let Some(path) = csv {
                save_games_to_csv(&games, &path)?;
                println!("\nSaved {} games to {}", games.len(), path.display());
            }
            if let Some(path) = json {
                save_games_to_json(&games, &path)?;
                println!("\nSaved {} games to {}", games.len(), path.display());
            }
        }
        Command::Publish { name, from_json } => {
            let calendar = lookup_calendar(&calendars, &name)?;
            let games = load_games_from_json(&from_json)
                .with_context(|| format!("Failed to load games from {}", from_json.display()))?;
            let store = calendar_store(&config, cli.dry_run, &memory).await;
            let summary = publish_games(&Publisher::new(store), &calendar, &games).await;
            print_summary(&summary);
        }
    }

    if cli.dry_run {
        print_documents(&memory)?;
    }

    Ok(())
}
