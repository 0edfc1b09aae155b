//! Login identities and the credential check.

use async_trait::async_trait;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

/// Accepted email of the built-in demo account.
pub const DEMO_EMAIL: &str = "user@gate.io";
/// Accepted password of the built-in demo account.
pub const DEMO_PASSWORD: &str = "gatekeeper";

/// Email/password pair typed at the login screen. Never persisted.
#[derive(Debug, Clone)]
pub struct Identity {
    email: String,
    password: SecretString,
}

impl Identity {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &SecretString {
        &self.password
    }
}

/// Normalize an email for comparison.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// External credential check. Production deployments point this at a remote
/// auth service; it only answers yes or no.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, identity: &Identity) -> bool;
}

/// Verifier accepting exactly one configured pair.
#[derive(Debug, Clone)]
pub struct StaticCredentialVerifier {
    email: String,
    password: SecretString,
}

impl StaticCredentialVerifier {
    #[must_use]
    pub fn new(email: &str, password: impl Into<String>) -> Self {
        Self {
            email: normalize_email(email),
            password: SecretString::from(password.into()),
        }
    }
}

impl Default for StaticCredentialVerifier {
    fn default() -> Self {
        Self::new(DEMO_EMAIL, DEMO_PASSWORD)
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, identity: &Identity) -> bool {
        let email = normalize_email(identity.email());
        if !valid_email(&email) {
            return false;
        }
        email == self.email
            && identity.password().expose_secret() == self.password.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" User@Gate.IO "), "user@gate.io");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("user@gate.io"));
        assert!(!valid_email("user@gate"));
        assert!(!valid_email("not an email"));
    }

    #[test]
    fn identity_debug_redacts_password() {
        let identity = Identity::new(DEMO_EMAIL, DEMO_PASSWORD);
        let debug = format!("{identity:?}");
        assert!(debug.contains(DEMO_EMAIL));
        assert!(!debug.contains(DEMO_PASSWORD));
    }

    #[tokio::test]
    async fn static_verifier_accepts_demo_pair_only() {
        let verifier = StaticCredentialVerifier::default();
        assert!(verifier.verify(&Identity::new(DEMO_EMAIL, DEMO_PASSWORD)).await);
        assert!(verifier.verify(&Identity::new(" USER@gate.io", DEMO_PASSWORD)).await);
        assert!(!verifier.verify(&Identity::new(DEMO_EMAIL, "Gatekeeper")).await);
        assert!(!verifier.verify(&Identity::new("user@example.com", DEMO_PASSWORD)).await);
        assert!(!verifier.verify(&Identity::new("", "")).await);
    }
}
