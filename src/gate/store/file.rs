//! File-backed flag store.
//!
//! All flags share one JSON object on disk. A write rewrites the whole object
//! into a sibling temp file, syncs it and renames it over the original, so a
//! crash leaves either the old or the new object and never a torn one.

use super::{FlagKey, FlagStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_STATE_FILE: &str = ".biogate/state.json";

type Entries = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileFlagStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load(&self, key: FlagKey) -> Result<Entries, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(StoreError::unavailable(key, err)),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content)
            .map_err(|err| StoreError::unavailable(key, format!("corrupt state file: {err}")))
    }

    async fn replace_with(temp: &Path, path: &Path, json: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp).await?;
        file.write_all(json).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(temp, path).await
    }

    async fn persist(&self, key: FlagKey, entries: &Entries) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::unavailable(key, err))?;
        }

        let json =
            serde_json::to_vec_pretty(entries).map_err(|err| StoreError::unavailable(key, err))?;

        let temp = self.temp_path();
        if let Err(err) = Self::replace_with(&temp, &self.path, &json).await {
            // Best effort.
            let _ = fs::remove_file(&temp).await;
            return Err(StoreError::unavailable(key, err));
        }

        debug!("persisted {key} to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl FlagStore for FileFlagStore {
    async fn get(&self, key: FlagKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load(key).await?;
        Ok(entries.remove(key.as_str()))
    }

    async fn set(&self, key: FlagKey, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load(key).await?;
        entries.insert(key.as_str().to_string(), value.to_string());
        self.persist(key, &entries).await
    }

    async fn remove(&self, key: FlagKey) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load(key).await?;
        if entries.remove(key.as_str()).is_none() {
            return Ok(());
        }
        self.persist(key, &entries).await
    }
}
