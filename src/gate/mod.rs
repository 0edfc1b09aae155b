//! Session and access gate.
//!
//! [`Gate`] wires the flag store, credential verifier, biometric provider and
//! navigator into the components that decide which screen a user may see.

pub mod biometrics;
pub mod credentials;
pub mod error;
pub mod login;
pub mod navigation;
pub mod onboarding;
pub mod router;
pub mod session;
pub mod store;

pub use self::error::Error;

use self::biometrics::{BiometricGate, BiometricProvider};
use self::credentials::CredentialVerifier;
use self::login::{DEFAULT_BIOMETRIC_PROMPT, LoginOrchestrator, LoginPrompter};
use self::navigation::{Navigator, Screen};
use self::onboarding::OnboardingFlow;
use self::session::SessionManager;
use self::store::FlagStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct GateConfig {
    biometric_prompt: String,
    challenge_timeout: Option<Duration>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GateConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            biometric_prompt: DEFAULT_BIOMETRIC_PROMPT.to_string(),
            challenge_timeout: None,
        }
    }

    #[must_use]
    pub fn with_biometric_prompt(mut self, prompt: String) -> Self {
        self.biometric_prompt = prompt;
        self
    }

    #[must_use]
    pub fn with_challenge_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.challenge_timeout = timeout;
        self
    }

    #[must_use]
    pub fn biometric_prompt(&self) -> &str {
        &self.biometric_prompt
    }

    #[must_use]
    pub fn challenge_timeout(&self) -> Option<Duration> {
        self.challenge_timeout
    }
}

pub struct Gate {
    config: GateConfig,
    session: Arc<SessionManager>,
    biometrics: Arc<BiometricGate>,
    navigator: Arc<dyn Navigator>,
}

impl Gate {
    #[must_use]
    pub fn new(
        config: GateConfig,
        store: Arc<dyn FlagStore>,
        verifier: Arc<dyn CredentialVerifier>,
        provider: Arc<dyn BiometricProvider>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let biometrics =
            BiometricGate::new(provider).with_timeout(config.challenge_timeout());
        Self {
            session: Arc::new(SessionManager::new(store, verifier)),
            biometrics: Arc::new(biometrics),
            navigator,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    #[must_use]
    pub fn biometrics(&self) -> &Arc<BiometricGate> {
        &self.biometrics
    }

    /// Cold start: pick the initial screen and navigate to it.
    pub async fn boot(&self) -> Screen {
        router::boot(&self.session, self.navigator.as_ref()).await
    }

    #[must_use]
    pub fn onboarding(&self) -> OnboardingFlow {
        OnboardingFlow::new(Arc::clone(&self.session), Arc::clone(&self.navigator))
    }

    /// A fresh login screen. Each mount gets its own orchestrator.
    #[must_use]
    pub fn login_screen(&self, prompter: Arc<dyn LoginPrompter>) -> LoginOrchestrator {
        LoginOrchestrator::new(
            Arc::clone(&self.session),
            Arc::clone(&self.biometrics),
            Arc::clone(&self.navigator),
            prompter,
        )
        .with_prompt(self.config.biometric_prompt())
    }

    /// Logout from the home screen and return to login.
    ///
    /// # Errors
    /// Returns [`Error::StorageUnavailable`] if the session token cannot be
    /// removed; the user stays where they are.
    pub async fn logout(&self) -> Result<Screen, Error> {
        self.session.logout().await?;
        self.navigator.navigate_to(Screen::Login);
        Ok(Screen::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_config_defaults_and_overrides() {
        let config = GateConfig::new();
        assert_eq!(config.biometric_prompt(), DEFAULT_BIOMETRIC_PROMPT);
        assert_eq!(config.challenge_timeout(), None);

        let config = config
            .with_biometric_prompt("Unlock vault".to_string())
            .with_challenge_timeout(Some(Duration::from_secs(30)));
        assert_eq!(config.biometric_prompt(), "Unlock vault");
        assert_eq!(config.challenge_timeout(), Some(Duration::from_secs(30)));
    }
}
