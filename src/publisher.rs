use crate::api::CalendarStore;
use crate::error::Result;
use crate::utils::slugify;
use std::sync::Arc;
use tracing::{error, info};

/// Object key a calendar is stored under
/// "College Football Top 25" -> "calendars/college-football-top-25.ics"
pub fn calendar_key(name: &str) -> String {
    format!("calendars/{}.ics", slugify(name))
}

/// Writes rendered calendars to their store
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn CalendarStore>,
}

impl Publisher {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// Store `document` under the calendar's key, replacing the previous
    /// version. Failures are logged and reported as `false`, never raised.
    pub async fn publish(&self, name: &str, document: &[u8]) -> bool {
        match self.put(name, document).await {
            Ok(key) => {
                info!(
                    calendar = name,
                    key = %key,
                    bytes = document.len(),
                    store = %self.store.describe(),
                    "Published calendar"
                );
                true
            }
            Err(e) => {
                error!(calendar = name, kind = e.kind(), error = %e, "Failed to publish calendar");
                false
            }
        }
    }

    async fn put(&self, name: &str, document: &[u8]) -> Result<String> {
        let key = calendar_key(name);
        self.store.put(&key, document.to_vec()).await?;
        Ok(key)
    }
}
