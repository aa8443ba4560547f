use thiserror::Error;

/// Failures that stop a calendar from being built or stored.
///
/// Missing fields on a scraped page are not errors; they come back as empty
/// strings from the scrapers.
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to store {key}: {message}")]
    Store { key: String, message: String },

    #[error("invalid selector {0}")]
    Selector(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CalendarError {
    /// Short machine-friendly name of the failure kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CalendarError::Fetch { .. } => "fetch",
            CalendarError::Status { .. } => "status",
            CalendarError::Store { .. } => "store",
            CalendarError::Selector(_) => "selector",
            CalendarError::Io(_) => "io",
            CalendarError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, CalendarError>;
