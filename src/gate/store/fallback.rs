//! Secure medium with a plain fallback.
//!
//! Keys marked secure go to the primary medium first. When the primary fails
//! the operation is retried on the secondary, so a broken keychain degrades to
//! ordinary storage instead of losing the write. Every other key lives on the
//! secondary only.

use super::{FlagKey, FlagStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

pub struct FallbackFlagStore {
    primary: Arc<dyn FlagStore>,
    secondary: Arc<dyn FlagStore>,
    secure: BTreeSet<FlagKey>,
}

impl FallbackFlagStore {
    /// Only the biometric preference is routed to the primary by default.
    #[must_use]
    pub fn new(primary: Arc<dyn FlagStore>, secondary: Arc<dyn FlagStore>) -> Self {
        Self {
            primary,
            secondary,
            secure: BTreeSet::from([FlagKey::BiometricEnabled]),
        }
    }

    #[must_use]
    pub fn with_secure_keys(mut self, keys: impl IntoIterator<Item = FlagKey>) -> Self {
        self.secure = keys.into_iter().collect();
        self
    }

    fn is_secure(&self, key: FlagKey) -> bool {
        self.secure.contains(&key)
    }
}

#[async_trait]
impl FlagStore for FallbackFlagStore {
    async fn get(&self, key: FlagKey) -> Result<Option<String>, StoreError> {
        if self.is_secure(key) {
            match self.primary.get(key).await {
                Ok(Some(value)) => return Ok(Some(value)),
                // A value written while the primary was down lives on the secondary.
                Ok(None) => {}
                Err(err) => warn!("Secure read failed, using fallback: {err}"),
            }
        }
        self.secondary.get(key).await
    }

    async fn set(&self, key: FlagKey, value: &str) -> Result<(), StoreError> {
        if self.is_secure(key) {
            match self.primary.set(key, value).await {
                Ok(()) => {
                    // Drop any copy left by an earlier fallback write.
                    if let Err(err) = self.secondary.remove(key).await {
                        warn!("Could not clear fallback copy of {key}: {err}");
                    }
                    return Ok(());
                }
                Err(err) => warn!("Secure write failed, using fallback: {err}"),
            }
        }
        self.secondary.set(key, value).await
    }

    async fn remove(&self, key: FlagKey) -> Result<(), StoreError> {
        if self.is_secure(key) {
            if let Err(err) = self.primary.remove(key).await {
                warn!("Secure remove failed: {err}");
            }
        }
        self.secondary.remove(key).await
    }
}
