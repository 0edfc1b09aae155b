//! # BioGate (Session & Access Gate)
//!
//! `biogate` decides, on every app launch and during login, which of three
//! screens a user may see: first-run onboarding, credential/biometric login, or
//! the protected home area.
//!
//! ## Persisted State
//!
//! Three independent entries live in a durable key-value store:
//! `onboarding_complete`, `biometric_enabled` and `session_token`. Reads that
//! fail degrade to "absent"; writes that fail are reported.
//!
//! ## Boot Routing
//!
//! Onboarding comes first. Once onboarding is done, an enabled biometric
//! preference always routes to login, even with a valid session token, so
//! every cold start is re-challenged.
//!
//! ## Login
//!
//! The login screen auto-challenges when biometrics are enabled and usable,
//! falls back silently to credentials when the challenge fails, and offers to
//! enable biometrics after a successful credential login.

pub mod cli;
pub mod gate;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
