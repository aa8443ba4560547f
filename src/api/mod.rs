pub mod http_client;
pub mod local_store;
pub mod s3_store;

pub use http_client::HttpPageSource;
pub use local_store::{LocalStore, MemoryStore};
pub use s3_store::S3Store;

use crate::error::Result;
use async_trait::async_trait;

/// Anything that can hand back the HTML behind a URL
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Durable home for published calendars, keyed like object storage
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Write `body` at `key`, replacing whatever was there
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;

    /// Human readable location used in logs
    fn describe(&self) -> String;
}
