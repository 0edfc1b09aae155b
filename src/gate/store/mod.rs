//! Persisted flag store.
//!
//! Three independent entries live in a durable key-value medium:
//!
//! | Key                   | Values                         |
//! |-----------------------|--------------------------------|
//! | `onboarding_complete` | `"true"` / absent              |
//! | `biometric_enabled`   | `"true"` / `"false"` / absent  |
//! | `session_token`       | opaque token / absent          |
//!
//! Every operation touches exactly one key and is atomic on its own. A missing
//! key is `Ok(None)`; only a failing medium is an error, so callers can tell
//! "never written" apart from "could not read".

mod fallback;
mod file;
mod memory;

pub use fallback::FallbackFlagStore;
pub use file::{DEFAULT_STATE_FILE, FileFlagStore};
pub use memory::MemoryFlagStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Literal stored for a set boolean flag.
pub const FLAG_TRUE: &str = "true";
/// Literal stored for a cleared boolean flag.
pub const FLAG_FALSE: &str = "false";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlagKey {
    OnboardingComplete,
    BiometricEnabled,
    SessionToken,
}

impl FlagKey {
    pub const ALL: [Self; 3] = [
        Self::OnboardingComplete,
        Self::BiometricEnabled,
        Self::SessionToken,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnboardingComplete => "onboarding_complete",
            Self::BiometricEnabled => "biometric_enabled",
            Self::SessionToken => "session_token",
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("flag store unavailable while accessing {key}: {reason}")]
    Unavailable { key: FlagKey, reason: String },
}

impl StoreError {
    pub(crate) fn unavailable(key: FlagKey, reason: impl fmt::Display) -> Self {
        Self::Unavailable {
            key,
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn key(&self) -> FlagKey {
        match self {
            Self::Unavailable { key, .. } => *key,
        }
    }
}

/// Durable key-value storage for the gate flags.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Read a key, `Ok(None)` when it was never written or was removed.
    async fn get(&self, key: FlagKey) -> Result<Option<String>, StoreError>;

    /// Durably write a key, replacing any previous value.
    async fn set(&self, key: FlagKey, value: &str) -> Result<(), StoreError>;

    /// Durably remove a key. Removing an absent key succeeds.
    async fn remove(&self, key: FlagKey) -> Result<(), StoreError>;
}

/// Read a boolean flag, degrading storage failures to `false`.
pub(crate) async fn read_flag(store: &dyn FlagStore, key: FlagKey) -> bool {
    match store.get(key).await {
        Ok(value) => value.as_deref() == Some(FLAG_TRUE),
        Err(err) => {
            warn!("Treating {key} as unset: {err}");
            false
        }
    }
}

/// Read an opaque value, degrading storage failures to absent.
pub(crate) async fn read_value(store: &dyn FlagStore, key: FlagKey) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(err) => {
            warn!("Treating {key} as absent: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn flag_key_names_match_persisted_layout() {
        assert_eq!(FlagKey::OnboardingComplete.as_str(), "onboarding_complete");
        assert_eq!(FlagKey::BiometricEnabled.as_str(), "biometric_enabled");
        assert_eq!(FlagKey::SessionToken.as_str(), "session_token");
    }

    #[tokio::test]
    async fn read_flag_only_accepts_literal_true() -> Result<()> {
        let store = MemoryFlagStore::new();
        assert!(!read_flag(&store, FlagKey::BiometricEnabled).await);

        store.set(FlagKey::BiometricEnabled, FLAG_FALSE).await?;
        assert!(!read_flag(&store, FlagKey::BiometricEnabled).await);

        store.set(FlagKey::BiometricEnabled, "TRUE").await?;
        assert!(!read_flag(&store, FlagKey::BiometricEnabled).await);

        store.set(FlagKey::BiometricEnabled, FLAG_TRUE).await?;
        assert!(read_flag(&store, FlagKey::BiometricEnabled).await);
        Ok(())
    }

    #[tokio::test]
    async fn read_helpers_degrade_when_unavailable() -> Result<()> {
        let store = MemoryFlagStore::new();
        store.set(FlagKey::OnboardingComplete, FLAG_TRUE).await?;
        store.set(FlagKey::SessionToken, "token").await?;
        store.set_available(false);

        assert!(!read_flag(&store, FlagKey::OnboardingComplete).await);
        assert_eq!(read_value(&store, FlagKey::SessionToken).await, None);
        Ok(())
    }
}
