use super::{FlagKey, FlagStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// In-process flag store.
///
/// Nothing survives a restart; it exists so the gate can run against a fake
/// medium. `set_available(false)` makes every operation fail, which is how
/// storage outages are simulated.
#[derive(Debug)]
pub struct MemoryFlagStore {
    entries: Mutex<BTreeMap<FlagKey, String>>,
    available: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryFlagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFlagStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed the store with existing entries, as if left by a previous run.
    #[must_use]
    pub fn with_entries<I, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (FlagKey, V)>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key, value.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
            available: AtomicBool::new(true),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful `set`/`remove` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> BTreeMap<FlagKey, String> {
        self.entries.lock().await.clone()
    }

    fn check(&self, key: FlagKey) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::unavailable(key, "memory store marked unavailable"))
        }
    }
}

#[async_trait]
impl FlagStore for MemoryFlagStore {
    async fn get(&self, key: FlagKey) -> Result<Option<String>, StoreError> {
        self.check(key)?;
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn set(&self, key: FlagKey, value: &str) -> Result<(), StoreError> {
        self.check(key)?;
        self.entries.lock().await.insert(key, value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: FlagKey) -> Result<(), StoreError> {
        self.check(key)?;
        self.entries.lock().await.remove(&key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
