//! Login screen state machine.
//!
//! Flow Overview:
//! - `mount` reads the biometric preference. When it is on and the sensor is
//!   usable the orchestrator auto-challenges; otherwise it waits for input.
//! - A passed challenge records a biometric session and goes home. A failed or
//!   cancelled one drops back to credential entry without any notice.
//! - A credential submission either fails with the single user-visible
//!   "invalid credentials" notice, or succeeds and may offer to enable
//!   biometrics before going home.
//!
//! The orchestrator owns every challenge it starts. Once torn down it ignores
//! further input and never navigates, even if a challenge resolves late.

use super::biometrics::BiometricGate;
use super::credentials::Identity;
use super::navigation::{Navigator, Screen};
use super::session::SessionManager;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BIOMETRIC_PROMPT: &str = "Login to BioGate";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    AutoChallenging,
    AwaitingManualInput,
    Authenticated,
    Failed,
}

/// UI hooks the login screen needs from its host.
#[async_trait]
pub trait LoginPrompter: Send + Sync {
    /// Show the "invalid email or password" notice.
    fn invalid_credentials(&self);

    /// Ask whether biometric login should be enabled for next time.
    async fn offer_biometrics(&self) -> bool;
}

#[derive(Debug, Default)]
struct TeardownInner {
    fired: AtomicBool,
    notify: Notify,
}

/// Shared handle used by the host to tear the login screen down.
#[derive(Clone, Debug, Default)]
pub struct Teardown {
    inner: Arc<TeardownInner>,
}

impl Teardown {
    pub fn fire(&self) {
        self.inner.fired.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    async fn fired(&self) {
        // Register before checking the flag so a concurrent fire is not missed.
        let notified = self.inner.notify.notified();
        if self.is_fired() {
            return;
        }
        notified.await;
    }
}

pub struct LoginOrchestrator {
    session: Arc<SessionManager>,
    biometrics: Arc<BiometricGate>,
    navigator: Arc<dyn Navigator>,
    prompter: Arc<dyn LoginPrompter>,
    prompt: String,
    state: LoginState,
    teardown: Teardown,
}

impl LoginOrchestrator {
    #[must_use]
    pub fn new(
        session: Arc<SessionManager>,
        biometrics: Arc<BiometricGate>,
        navigator: Arc<dyn Navigator>,
        prompter: Arc<dyn LoginPrompter>,
    ) -> Self {
        Self {
            session,
            biometrics,
            navigator,
            prompter,
            prompt: DEFAULT_BIOMETRIC_PROMPT.to_string(),
            state: LoginState::Idle,
            teardown: Teardown::default(),
        }
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn state(&self) -> LoginState {
        self.state
    }

    #[must_use]
    pub fn teardown_handle(&self) -> Teardown {
        self.teardown.clone()
    }

    /// Tear the screen down. Later calls are ignored.
    pub fn teardown(&mut self) {
        self.teardown.fire();
        self.transition(LoginState::Idle);
    }

    /// Whether the "login with biometrics" action should be shown.
    pub async fn biometric_login_offered(&self) -> bool {
        self.session.is_biometric_enabled().await && self.biometrics.capability().await.usable()
    }

    /// Screen mounted: auto-challenge or wait for credentials.
    pub async fn mount(&mut self) -> LoginState {
        if !self.accepting(LoginState::Idle, "mount") {
            return self.state;
        }

        let auto_challenge = self.biometric_login_offered().await;
        if self.dismissed() {
            return self.state;
        }

        if auto_challenge {
            self.run_challenge().await;
        } else {
            self.transition(LoginState::AwaitingManualInput);
        }
        self.state
    }

    /// Explicit "use biometrics" action from credential entry.
    pub async fn retry_biometrics(&mut self) -> LoginState {
        if !self.accepting(LoginState::AwaitingManualInput, "biometric retry") {
            return self.state;
        }

        let offered = self.biometric_login_offered().await;
        if self.dismissed() {
            return self.state;
        }
        if !offered {
            debug!("biometric login not offered; staying on credential entry");
            return self.state;
        }

        self.run_challenge().await;
        self.state
    }

    /// Credential submission.
    pub async fn submit(&mut self, identity: &Identity) -> LoginState {
        if !self.accepting(LoginState::AwaitingManualInput, "credential submission") {
            return self.state;
        }

        let result = self.session.login(identity).await;
        if self.dismissed() {
            return self.state;
        }

        match result {
            Ok(()) => self.after_credential_login().await,
            Err(err) if err.is_user_visible() => {
                self.transition(LoginState::Failed);
                self.prompter.invalid_credentials();
                self.transition(LoginState::AwaitingManualInput);
            }
            Err(err) => {
                error!("Login could not be completed: {err}");
                self.transition(LoginState::AwaitingManualInput);
            }
        }
        self.state
    }

    async fn after_credential_login(&mut self) {
        let offer = !self.session.is_biometric_enabled().await
            && self.biometrics.capability().await.usable();
        if self.dismissed() {
            return;
        }

        if offer {
            let teardown = self.teardown.clone();
            let accepted = tokio::select! {
                biased;
                () = teardown.fired() => None,
                accepted = self.prompter.offer_biometrics() => Some(accepted),
            };
            let Some(accepted) = accepted else {
                self.dismissed();
                return;
            };

            if accepted {
                if let Err(err) = self.session.set_biometric_enabled(true).await {
                    warn!("Could not enable biometrics: {err}");
                }
            } else {
                debug!("biometric offer declined");
            }
            if self.dismissed() {
                return;
            }
        }

        self.authenticated();
    }

    async fn run_challenge(&mut self) {
        self.transition(LoginState::AutoChallenging);

        let teardown = self.teardown.clone();
        let outcome = tokio::select! {
            biased;
            () = teardown.fired() => None,
            outcome = self.biometrics.challenge(&self.prompt) => Some(outcome),
        };
        let Some(outcome) = outcome else {
            debug!("pending biometric challenge discarded on teardown");
            self.dismissed();
            return;
        };

        match outcome {
            Ok(proof) => {
                let recorded = self.session.login_with_biometrics(proof).await;
                if self.dismissed() {
                    return;
                }
                match recorded {
                    Ok(()) => self.authenticated(),
                    Err(err) => {
                        warn!("Biometric session could not be recorded: {err}");
                        self.transition(LoginState::AwaitingManualInput);
                    }
                }
            }
            Err(err) => {
                info!("Biometric login did not complete ({err}); falling back to credentials");
                self.transition(LoginState::AwaitingManualInput);
            }
        }
    }

    fn authenticated(&mut self) {
        self.transition(LoginState::Authenticated);
        self.navigator.navigate_to(Screen::Home);
    }

    fn accepting(&self, expected: LoginState, action: &str) -> bool {
        if self.teardown.is_fired() {
            debug!("ignoring {action} after teardown");
            return false;
        }
        if self.state != expected {
            warn!("Ignoring {action} in state {:?}", self.state);
            return false;
        }
        true
    }

    /// Reset to idle if the screen was torn down while awaiting.
    fn dismissed(&mut self) -> bool {
        if self.teardown.is_fired() {
            self.transition(LoginState::Idle);
            true
        } else {
            false
        }
    }

    fn transition(&mut self, next: LoginState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "login transition");
            self.state = next;
        }
    }
}
