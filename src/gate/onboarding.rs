//! First-run onboarding walk-through.

use super::error::Error;
use super::navigation::{Navigator, Screen};
use super::session::SessionManager;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnboardingStep {
    pub title: &'static str,
    pub description: &'static str,
}

pub const STEPS: [OnboardingStep; 3] = [
    OnboardingStep {
        title: "Secure access",
        description: "Advanced biometric security for your digital fortress.",
    },
    OnboardingStep {
        title: "Biometric gateway",
        description: "Face and fingerprint recognition at the speed of light.",
    },
    OnboardingStep {
        title: "Ready to start?",
        description: "Step into the future of authentication today.",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnboardingProgress {
    /// Moved to the step at this index.
    Step(usize),
    /// Flag written and control handed to the login screen.
    Completed,
}

pub struct OnboardingFlow {
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    index: usize,
}

impl OnboardingFlow {
    #[must_use]
    pub fn new(session: Arc<SessionManager>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            index: 0,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> &'static OnboardingStep {
        &STEPS[self.index]
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 == STEPS.len()
    }

    /// Advance one step; on the last step persist completion and go to login.
    ///
    /// # Errors
    /// Returns [`Error::StorageUnavailable`] if the completion flag cannot be
    /// written. The flow stays on the last step so the user can retry.
    pub async fn advance(&mut self) -> Result<OnboardingProgress, Error> {
        if !self.is_last() {
            self.index += 1;
            return Ok(OnboardingProgress::Step(self.index));
        }

        self.session.set_onboarding_complete(true).await?;
        info!("Onboarding completed");
        self.navigator.navigate_to(Screen::Login);
        Ok(OnboardingProgress::Completed)
    }
}
