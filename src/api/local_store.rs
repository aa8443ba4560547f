use super::CalendarStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Writes calendars below a directory, mirroring the object keys
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl CalendarStore for LocalStore {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Keeps published calendars in memory (dry runs)
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    /// All stored objects, ordered by key
    pub fn objects(&self) -> Vec<(String, Vec<u8>)> {
        self.lock()
            .iter()
            .map(|(key, body)| (key.clone(), body.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // Entries are inserted whole, so a poisoned map is still consistent
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CalendarStore for MemoryStore {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.lock().insert(key.to_string(), body);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
