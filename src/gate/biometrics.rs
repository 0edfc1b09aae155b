//! Biometric challenge provider and the single-slot gate in front of it.
//!
//! Platform sensors are reached through [`BiometricProvider`], which only
//! answers success or failure. [`BiometricGate`] wraps a provider and owns the
//! challenge slot: at most one challenge is outstanding, an optional timeout
//! counts as a failure, and a successful challenge is the only way to obtain a
//! [`BiometricProof`].

use super::error::Error;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// What the device reports about its biometric sensor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub hardware_present: bool,
    pub enrolled: bool,
}

impl Capability {
    #[must_use]
    pub const fn usable(self) -> bool {
        self.hardware_present && self.enrolled
    }
}

#[async_trait]
pub trait BiometricProvider: Send + Sync {
    /// Side-effect free; may be called any number of times.
    async fn query_capability(&self) -> Capability;

    /// Show the platform prompt and resolve once. Cancel, mismatch and
    /// hardware errors all come back as `false`.
    async fn challenge(&self, prompt: &str) -> bool;
}

/// Evidence that a biometric challenge succeeded.
///
/// Only [`BiometricGate::challenge`] can create one, so a biometric login
/// cannot be recorded without a preceding successful challenge.
#[derive(Debug)]
pub struct BiometricProof {
    _private: (),
}

/// Releases the challenge slot when dropped, including when the awaiting
/// future is cancelled.
struct ChallengeSlot<'a>(&'a AtomicBool);

impl Drop for ChallengeSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct BiometricGate {
    provider: Arc<dyn BiometricProvider>,
    timeout: Option<Duration>,
    outstanding: AtomicBool,
}

impl BiometricGate {
    #[must_use]
    pub fn new(provider: Arc<dyn BiometricProvider>) -> Self {
        Self {
            provider,
            timeout: None,
            outstanding: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    pub async fn capability(&self) -> Capability {
        self.provider.query_capability().await
    }

    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Run one challenge.
    ///
    /// # Errors
    /// - [`Error::ChallengeInProgress`] if another challenge has not resolved yet
    /// - [`Error::BiometricUnavailable`] if the sensor is missing or not enrolled
    /// - [`Error::BiometricChallengeFailed`] if the provider reports failure or
    ///   the configured timeout elapses
    pub async fn challenge(&self, prompt: &str) -> Result<BiometricProof, Error> {
        if self
            .outstanding
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::ChallengeInProgress);
        }
        let _slot = ChallengeSlot(&self.outstanding);

        if !self.capability().await.usable() {
            debug!("biometric sensor not usable");
            return Err(Error::BiometricUnavailable);
        }

        let passed = match self.timeout {
            Some(limit) => {
                if let Ok(passed) = timeout(limit, self.provider.challenge(prompt)).await {
                    passed
                } else {
                    warn!("Biometric challenge timed out after {}s", limit.as_secs_f64());
                    false
                }
            }
            None => self.provider.challenge(prompt).await,
        };

        if passed {
            debug!("biometric challenge passed");
            Ok(BiometricProof { _private: () })
        } else {
            debug!("biometric challenge failed");
            Err(Error::BiometricChallengeFailed)
        }
    }
}
