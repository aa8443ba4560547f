//! Runtime configuration from environment variables (a `.env` file is
//! loaded first by the binaries).

use crate::api::{CalendarStore, HttpPageSource, LocalStore, S3Store};
use crate::api::http_client::DEFAULT_USER_AGENT;
use crate::error::{CalendarError, Result};
use crate::models::League;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_BUCKET: &str = "hathaway.cc";
pub const DEFAULT_TEAMS: &str = "Notre Dame Football=87,Ohio State Football=194";
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEB_ADDR: &str = "127.0.0.1:3000";

/// A calendar that follows one team's season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCalendar {
    pub name: String,
    pub league: League,
    pub team_id: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// S3 bucket calendars are published to
    pub bucket: String,

    /// Custom S3 endpoint (LocalStack, minio)
    pub s3_endpoint_url: Option<String>,

    /// Publish to this directory instead of S3
    pub output_dir: Option<PathBuf>,

    pub teams: Vec<TeamCalendar>,

    /// Detail pages fetched at once per calendar
    pub fetch_concurrency: usize,

    pub fetch_timeout: Duration,

    pub user_agent: String,

    /// Bind address for the web binary
    pub web_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bucket = lookup("CALENDAR_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        let s3_endpoint_url = lookup("S3_ENDPOINT_URL").filter(|v| !v.is_empty());
        let output_dir = lookup("CALENDAR_OUTPUT_DIR")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let teams = parse_teams(
            &lookup("CALENDAR_TEAMS").unwrap_or_else(|| DEFAULT_TEAMS.to_string()),
        )?;

        let fetch_concurrency: usize =
            parse_number(&lookup, "FETCH_CONCURRENCY", DEFAULT_FETCH_CONCURRENCY)?;
        if fetch_concurrency == 0 {
            return Err(CalendarError::Config(
                "FETCH_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let fetch_timeout = Duration::from_secs(parse_number(
            &lookup,
            "FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?);

        let user_agent = lookup("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let web_addr = lookup("WEB_ADDR").unwrap_or_else(|| DEFAULT_WEB_ADDR.to_string());

        Ok(Self {
            bucket,
            s3_endpoint_url,
            output_dir,
            teams,
            fetch_concurrency,
            fetch_timeout,
            user_agent,
            web_addr,
        })
    }

    pub fn page_source(&self) -> Result<HttpPageSource> {
        HttpPageSource::new(&self.user_agent, self.fetch_timeout)
    }

    /// Local directory when one is configured, S3 otherwise
    pub async fn store(&self) -> Arc<dyn CalendarStore> {
        match &self.output_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "Publishing calendars to local directory");
                Arc::new(LocalStore::new(dir))
            }
            None => {
                info!(bucket = %self.bucket, "Publishing calendars to S3");
                Arc::new(S3Store::new(&self.bucket, self.s3_endpoint_url.as_deref()).await)
            }
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| CalendarError::Config(format!("{key} is not a valid number: {value}"))),
        None => Ok(default),
    }
}

/// Parse `Name=id` pairs separated by commas. A `nfl:` prefix selects the
/// NFL site; everything else is college football.
/// "Notre Dame Football=87,nfl:Baltimore Ravens=33"
pub fn parse_teams(list: &str) -> Result<Vec<TeamCalendar>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (league, entry) = match entry.strip_prefix("nfl:") {
                Some(rest) => (League::Nfl, rest),
                None => (League::CollegeFootball, entry),
            };

            let (name, id) = entry
                .rsplit_once('=')
                .ok_or_else(|| CalendarError::Config(format!("team entry missing '=': {entry}")))?;

            let name = name.trim();
            if name.is_empty() {
                return Err(CalendarError::Config(format!("team entry missing name: {entry}")));
            }

            let team_id = id
                .trim()
                .parse()
                .map_err(|_| CalendarError::Config(format!("invalid team id in: {entry}")))?;

            Ok(TeamCalendar {
                name: name.to_string(),
                league,
                team_id,
            })
        })
        .collect()
}
