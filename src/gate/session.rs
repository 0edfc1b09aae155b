//! Session lifecycle on top of the flag store.
//!
//! Flow Overview:
//! - `login` verifies an identity and writes a fresh credential session token.
//! - `login_with_biometrics` consumes a [`BiometricProof`] and writes a
//!   biometric session token (prefixed `bio_`).
//! - `logout` removes the token and nothing else; the biometric preference
//!   survives so the next login can use the shortcut.
//!
//! Security boundaries: the biometric preference can only be switched on after
//! a credential login succeeded in this process. Switching it off is always
//! allowed.

use super::biometrics::BiometricProof;
use super::credentials::{CredentialVerifier, Identity};
use super::error::Error;
use super::store::{FLAG_FALSE, FLAG_TRUE, FlagKey, FlagStore, read_flag, read_value};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Prefix for session tokens minted by a biometric login.
pub(crate) const BIOMETRIC_TOKEN_PREFIX: &str = "bio_";

/// How the current session was established.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    Credentials,
    Biometric,
}

impl SessionOrigin {
    /// Classify a session token by its prefix.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        if token.starts_with(BIOMETRIC_TOKEN_PREFIX) {
            Self::Biometric
        } else {
            Self::Credentials
        }
    }
}

/// Create a new opaque session token.
fn generate_session_token(origin: SessionOrigin) -> Result<String, Error> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| Error::TokenGeneration)?;
    let encoded = Base64UrlUnpadded::encode_string(&bytes);
    Ok(match origin {
        SessionOrigin::Credentials => encoded,
        SessionOrigin::Biometric => format!("{BIOMETRIC_TOKEN_PREFIX}{encoded}"),
    })
}

pub struct SessionManager {
    store: Arc<dyn FlagStore>,
    verifier: Arc<dyn CredentialVerifier>,
    // Serializes token read-modify-write so concurrent logins cannot race.
    session_lock: Mutex<()>,
    credential_verified: AtomicBool,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn FlagStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            store,
            verifier,
            session_lock: Mutex::new(()),
            credential_verified: AtomicBool::new(false),
        }
    }

    /// Verify `identity` and start a credential session.
    ///
    /// # Errors
    /// - [`Error::CredentialRejected`] when the verifier says no; nothing is written
    /// - [`Error::StorageUnavailable`] when the token cannot be persisted
    pub async fn login(&self, identity: &Identity) -> Result<(), Error> {
        let _guard = self.session_lock.lock().await;

        if !self.verifier.verify(identity).await {
            info!("Credential login rejected");
            return Err(Error::CredentialRejected);
        }

        let token = generate_session_token(SessionOrigin::Credentials)?;
        if let Err(err) = self.store.set(FlagKey::SessionToken, &token).await {
            error!("Failed to persist session token: {err}");
            return Err(err.into());
        }

        self.credential_verified.store(true, Ordering::SeqCst);
        info!("Credential login succeeded");
        Ok(())
    }

    /// Start a biometric session. The proof is consumed so it cannot be reused.
    ///
    /// # Errors
    /// Returns [`Error::StorageUnavailable`] when the token cannot be persisted.
    pub async fn login_with_biometrics(&self, proof: BiometricProof) -> Result<(), Error> {
        let _guard = self.session_lock.lock().await;
        drop(proof);

        let token = generate_session_token(SessionOrigin::Biometric)?;
        if let Err(err) = self.store.set(FlagKey::SessionToken, &token).await {
            error!("Failed to persist biometric session token: {err}");
            return Err(err.into());
        }

        info!("Biometric login succeeded");
        Ok(())
    }

    /// End the session. The biometric preference is left as it is.
    ///
    /// # Errors
    /// Returns [`Error::StorageUnavailable`] when the token cannot be removed.
    pub async fn logout(&self) -> Result<(), Error> {
        let _guard = self.session_lock.lock().await;
        self.credential_verified.store(false, Ordering::SeqCst);

        if let Err(err) = self.store.remove(FlagKey::SessionToken).await {
            error!("Failed to remove session token: {err}");
            return Err(err.into());
        }

        info!("Logged out");
        Ok(())
    }

    pub async fn is_logged_in(&self) -> bool {
        read_value(self.store.as_ref(), FlagKey::SessionToken)
            .await
            .is_some()
    }

    pub async fn session_origin(&self) -> Option<SessionOrigin> {
        read_value(self.store.as_ref(), FlagKey::SessionToken)
            .await
            .map(|token| SessionOrigin::from_token(&token))
    }

    /// Persist the biometric preference.
    ///
    /// # Errors
    /// - [`Error::CredentialLoginRequired`] when enabling without a prior
    ///   credential login in this process
    /// - [`Error::StorageUnavailable`] when the write fails
    pub async fn set_biometric_enabled(&self, enabled: bool) -> Result<(), Error> {
        // Held across check and write so a logout cannot slip in between.
        let _guard = self.session_lock.lock().await;
        if enabled && !self.credential_verified.load(Ordering::SeqCst) {
            warn!("Refusing to enable biometrics without a credential login");
            return Err(Error::CredentialLoginRequired);
        }

        let value = if enabled { FLAG_TRUE } else { FLAG_FALSE };
        self.store
            .set(FlagKey::BiometricEnabled, value)
            .await
            .map_err(|err| {
                error!("Failed to persist biometric preference: {err}");
                Error::from(err)
            })?;

        info!(enabled, "Biometric preference updated");
        Ok(())
    }

    pub async fn is_biometric_enabled(&self) -> bool {
        read_flag(self.store.as_ref(), FlagKey::BiometricEnabled).await
    }

    /// Mark onboarding as done. `false` removes the flag.
    ///
    /// # Errors
    /// Returns [`Error::StorageUnavailable`] when the write fails.
    pub async fn set_onboarding_complete(&self, complete: bool) -> Result<(), Error> {
        let result = if complete {
            self.store.set(FlagKey::OnboardingComplete, FLAG_TRUE).await
        } else {
            self.store.remove(FlagKey::OnboardingComplete).await
        };
        result.map_err(|err| {
            error!("Failed to persist onboarding flag: {err}");
            Error::from(err)
        })
    }

    pub async fn is_onboarding_complete(&self) -> bool {
        read_flag(self.store.as_ref(), FlagKey::OnboardingComplete).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::biometrics::{BiometricGate, BiometricProvider, Capability};
    use crate::gate::credentials::{DEMO_EMAIL, DEMO_PASSWORD, StaticCredentialVerifier};
    use crate::gate::store::{MemoryFlagStore, StoreError};
    use anyhow::Result;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct AlwaysPasses;

    #[async_trait]
    impl BiometricProvider for AlwaysPasses {
        async fn query_capability(&self) -> Capability {
            Capability {
                hardware_present: true,
                enrolled: true,
            }
        }

        async fn challenge(&self, _prompt: &str) -> bool {
            true
        }
    }

    fn manager(store: &Arc<MemoryFlagStore>) -> SessionManager {
        SessionManager::new(
            store.clone(),
            Arc::new(StaticCredentialVerifier::default()),
        )
    }

    async fn proof() -> Result<BiometricProof> {
        Ok(BiometricGate::new(Arc::new(AlwaysPasses))
            .challenge("test")
            .await?)
    }

    #[test]
    fn session_origin_from_token_classifies_prefix() {
        assert_eq!(
            SessionOrigin::from_token(&format!("{BIOMETRIC_TOKEN_PREFIX}abc")),
            SessionOrigin::Biometric
        );
        assert_eq!(SessionOrigin::from_token("abc"), SessionOrigin::Credentials);
    }

    #[test]
    fn generated_tokens_are_unique_and_url_safe() -> Result<()> {
        let first = generate_session_token(SessionOrigin::Credentials)?;
        let second = generate_session_token(SessionOrigin::Credentials)?;
        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));

        let bio = generate_session_token(SessionOrigin::Biometric)?;
        assert!(bio.starts_with(BIOMETRIC_TOKEN_PREFIX));
        Ok(())
    }

    #[tokio::test]
    async fn valid_login_starts_session() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);

        sessions
            .login(&Identity::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await?;

        assert!(sessions.is_logged_in().await);
        assert_eq!(
            sessions.session_origin().await,
            Some(SessionOrigin::Credentials)
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_login_mutates_nothing() {
        let store = Arc::new(MemoryFlagStore::with_entries([(
            FlagKey::OnboardingComplete,
            FLAG_TRUE,
        )]));
        let sessions = manager(&store);
        let before = store.snapshot().await;

        let result = sessions.login(&Identity::new(DEMO_EMAIL, "wrong")).await;

        assert!(matches!(result, Err(Error::CredentialRejected)));
        assert!(!sessions.is_logged_in().await);
        assert_eq!(store.snapshot().await, before);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn login_surfaces_storage_failure() {
        let store = Arc::new(MemoryFlagStore::new());
        store.set_available(false);
        let sessions = manager(&store);

        let result = sessions
            .login(&Identity::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await;
        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn logout_keeps_biometric_preference() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);
        sessions
            .login(&Identity::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await?;
        sessions.set_biometric_enabled(true).await?;

        sessions.logout().await?;

        assert!(!sessions.is_logged_in().await);
        assert!(sessions.is_biometric_enabled().await);
        assert_eq!(
            store.get(FlagKey::BiometricEnabled).await?.as_deref(),
            Some(FLAG_TRUE)
        );
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_session_is_harmless() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);
        sessions.logout().await?;
        assert!(!sessions.is_logged_in().await);
        Ok(())
    }

    #[tokio::test]
    async fn biometric_login_writes_biometric_token() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);

        sessions.login_with_biometrics(proof().await?).await?;

        assert!(sessions.is_logged_in().await);
        assert_eq!(
            sessions.session_origin().await,
            Some(SessionOrigin::Biometric)
        );
        Ok(())
    }

    #[tokio::test]
    async fn enabling_biometrics_requires_credential_login() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);

        sessions.login_with_biometrics(proof().await?).await?;
        assert!(matches!(
            sessions.set_biometric_enabled(true).await,
            Err(Error::CredentialLoginRequired)
        ));
        assert!(!sessions.is_biometric_enabled().await);

        // Disabling never needs a credential login.
        sessions.set_biometric_enabled(false).await?;
        assert_eq!(
            store.get(FlagKey::BiometricEnabled).await?.as_deref(),
            Some(FLAG_FALSE)
        );
        Ok(())
    }

    #[tokio::test]
    async fn logout_revokes_right_to_enable_biometrics() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);
        sessions
            .login(&Identity::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await?;
        sessions.logout().await?;

        assert!(matches!(
            sessions.set_biometric_enabled(true).await,
            Err(Error::CredentialLoginRequired)
        ));
        Ok(())
    }

    /// Parks `set(BiometricEnabled)` until released.
    struct ParkedPreference {
        inner: MemoryFlagStore,
        entered: AtomicBool,
        release: Notify,
    }

    #[async_trait]
    impl FlagStore for ParkedPreference {
        async fn get(&self, key: FlagKey) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: FlagKey, value: &str) -> Result<(), StoreError> {
            if key == FlagKey::BiometricEnabled {
                self.entered.store(true, Ordering::SeqCst);
                self.release.notified().await;
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: FlagKey) -> Result<(), StoreError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn logout_waits_for_pending_preference_write() -> Result<()> {
        let store = Arc::new(ParkedPreference {
            inner: MemoryFlagStore::new(),
            entered: AtomicBool::new(false),
            release: Notify::new(),
        });
        let sessions = Arc::new(SessionManager::new(
            store.clone(),
            Arc::new(StaticCredentialVerifier::default()),
        ));
        sessions
            .login(&Identity::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await?;

        let enabling = tokio::spawn({
            let sessions = sessions.clone();
            async move { sessions.set_biometric_enabled(true).await }
        });
        while !store.entered.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        let logging_out = tokio::spawn({
            let sessions = sessions.clone();
            async move { sessions.logout().await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(sessions.is_logged_in().await);

        store.release.notify_one();
        enabling.await??;
        logging_out.await??;

        assert!(!sessions.is_logged_in().await);
        assert_eq!(
            store.inner.get(FlagKey::BiometricEnabled).await?.as_deref(),
            Some(FLAG_TRUE)
        );
        Ok(())
    }

    #[tokio::test]
    async fn onboarding_completion_is_idempotent() -> Result<()> {
        let store = Arc::new(MemoryFlagStore::new());
        let sessions = manager(&store);

        sessions.set_onboarding_complete(true).await?;
        let once = store.snapshot().await;
        sessions.set_onboarding_complete(true).await?;

        assert_eq!(store.snapshot().await, once);
        assert!(sessions.is_onboarding_complete().await);

        sessions.set_onboarding_complete(false).await?;
        assert_eq!(store.get(FlagKey::OnboardingComplete).await?, None);
        Ok(())
    }
}
