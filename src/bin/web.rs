use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use football_calendars::calendar::calendar_url;
use football_calendars::config::Config;
use football_calendars::pipeline::{default_calendars, RunSummary};
use football_calendars::run_default_calendars;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::services::ServeDir;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct CalendarRow {
    name: String,
    filter: String,
    listing_url: String,
    feed_url: String,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    calendars: Vec<CalendarRow>,
    last_run_at: String,
    last_error: String,
    results: Vec<RunSummary>,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

struct LastRun {
    finished_at: DateTime<Utc>,
    summaries: Vec<RunSummary>,
    error: Option<String>,
}

struct AppState {
    config: Config,
    last_run: RwLock<Option<LastRun>>,
    // Only one run at a time
    run_lock: Mutex<()>,
}

type SharedState = Arc<AppState>;

async fn home(State(state): State<SharedState>) -> impl IntoResponse {
    let calendars = default_calendars(&state.config)
        .into_iter()
        .map(|calendar| CalendarRow {
            filter: format!("{:?}", calendar.filter),
            listing_url: calendar.listing_url(),
            feed_url: calendar_url(&calendar.name),
            name: calendar.name,
        })
        .collect();

    let last_run = state.last_run.read().await;
    let template = match last_run.as_ref() {
        Some(run) => IndexTemplate {
            calendars,
            last_run_at: run.finished_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            last_error: run.error.clone().unwrap_or_default(),
            results: run.summaries.clone(),
        },
        None => IndexTemplate {
            calendars,
            last_run_at: String::new(),
            last_error: String::new(),
            results: Vec::new(),
        },
    };

    HtmlTemplate(template)
}

/// Scheduled trigger: the body is logged and otherwise ignored
async fn invoke(State(state): State<SharedState>, body: String) -> impl IntoResponse {
    let event: serde_json::Value =
        serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
    info!(%event, "Received event");

    let _guard = state.run_lock.lock().await;
    let result = run_default_calendars(&state.config).await;

    let (status, response, run) = match result {
        Ok(summaries) => (
            StatusCode::OK,
            json!({ "status": "Success", "calendars": summaries }),
            LastRun {
                finished_at: Utc::now(),
                summaries,
                error: None,
            },
        ),
        Err(e) => {
            error!(error = ?e, "Calendar run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "status": "Failed", "error": format!("{:#}", e) }),
                LastRun {
                    finished_at: Utc::now(),
                    summaries: Vec::new(),
                    error: Some(format!("{:#}", e)),
                },
            )
        }
    };

    *state.last_run.write().await = Some(run);
    (status, Json(response))
}

async fn health() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let addr = config.web_addr.clone();
    let output_dir = config.output_dir.clone();

    let state = Arc::new(AppState {
        config,
        last_run: RwLock::new(None),
        run_lock: Mutex::new(()),
    });

    let mut app = Router::new()
        .route("/", get(home))
        .route("/invoke", post(invoke))
        .route("/health", get(health));

    // Locally published calendars are served at the same path as the bucket
    if let Some(dir) = output_dir {
        app = app.nest_service("/calendars", ServeDir::new(dir.join("calendars")));
    }

    let app = app.with_state(state);

    info!("Starting web server at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
