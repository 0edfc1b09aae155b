use super::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
    #[error("invalid credentials")]
    CredentialRejected,
    #[error("biometrics unavailable on this device")]
    BiometricUnavailable,
    #[error("biometric challenge failed")]
    BiometricChallengeFailed,
    #[error("a biometric challenge is already outstanding")]
    ChallengeInProgress,
    #[error("biometrics can only be enabled after a credential login")]
    CredentialLoginRequired,
    #[error("failed to generate session token")]
    TokenGeneration,
}

impl Error {
    /// Whether the failure should be shown to the user. Only rejected
    /// credentials are; everything else degrades to the next-best flow.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::CredentialRejected)
    }
}
