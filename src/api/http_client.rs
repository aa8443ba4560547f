use super::PageSource;
use crate::error::{CalendarError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fetches ESPN pages over HTTP
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| CalendarError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CalendarError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CalendarError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| CalendarError::Fetch {
            url: url.to_string(),
            source,
        })
    }
}
