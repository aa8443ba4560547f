use super::CalendarStore;
use crate::error::{CalendarError, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::debug;

const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Publishes calendars to an S3 bucket
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from the ambient AWS configuration
    pub async fn new(bucket: impl Into<String>, endpoint_url: Option<&str>) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        // For LocalStack/minio, use custom endpoint
        let client = if let Some(endpoint) = endpoint_url {
            let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
                .endpoint_url(endpoint)
                .force_path_style(true)
                .build();
            Client::from_conf(s3_config)
        } else {
            Client::new(&aws_config)
        };

        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl CalendarStore for S3Store {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let response = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(CALENDAR_CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| CalendarError::Store {
                key: key.to_string(),
                message: format!("{e}"),
            })?;

        debug!(bucket = %self.bucket, key, etag = ?response.e_tag(), "PutObject succeeded");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}
