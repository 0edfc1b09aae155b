use crate::GIT_COMMIT_HASH;
use crate::cli::actions::{build_gate, terminal::Answer};
use crate::cli::globals::GlobalArgs;
use crate::gate::Gate;
use crate::gate::biometrics::Capability;
use crate::gate::navigation::Screen;
use crate::gate::router::{BootFlags, initial_screen, read_flags};
use crate::gate::session::SessionOrigin;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Status {
    pub version: &'static str,
    pub commit: &'static str,
    pub state_file: String,
    pub onboarding_complete: bool,
    pub biometric_enabled: bool,
    pub session: Option<SessionOrigin>,
    pub sensor: Capability,
    pub boot_screen: Screen,
}

/// Snapshot the persisted flags without navigating anywhere.
pub async fn collect(gate: &Gate, state_file: String) -> Status {
    let BootFlags {
        onboarding_complete,
        biometric_enabled,
        session_present,
    } = read_flags(gate.session()).await;

    Status {
        version: env!("CARGO_PKG_VERSION"),
        commit: GIT_COMMIT_HASH,
        state_file,
        onboarding_complete,
        biometric_enabled,
        session: if session_present {
            gate.session().session_origin().await
        } else {
            None
        },
        sensor: gate.biometrics().capability().await,
        boot_screen: initial_screen(BootFlags {
            onboarding_complete,
            biometric_enabled,
            session_present,
        }),
    }
}

/// Print the persisted flags and the screen the next launch would open.
/// # Errors
/// Returns an error if the status cannot be serialized.
pub async fn execute(globals: GlobalArgs) -> Result<()> {
    let (gate, _) = build_gate(&globals, Answer::No);
    let status = collect(&gate, globals.state_file.display().to_string()).await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::store::{FileFlagStore, FlagKey, FlagStore};

    #[tokio::test]
    async fn test_collect_reports_boot_target() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let globals = GlobalArgs::new(dir.path().join("state.json"));

        let (gate, navigator) = build_gate(&globals, Answer::No);
        let status = collect(&gate, String::new()).await;
        assert!(!status.onboarding_complete);
        assert_eq!(status.session, None);
        assert_eq!(status.boot_screen, Screen::Onboarding);
        assert!(navigator.history().is_empty());

        let store = FileFlagStore::new(globals.state_file.clone());
        store.set(FlagKey::OnboardingComplete, "true").await?;
        store.set(FlagKey::SessionToken, "bio_token").await?;

        let status = collect(&gate, String::new()).await;
        assert_eq!(status.session, Some(SessionOrigin::Biometric));
        assert_eq!(status.boot_screen, Screen::Home);

        let json = serde_json::to_value(&status)?;
        assert_eq!(json["boot_screen"], "home");
        assert_eq!(json["session"], "biometric");
        Ok(())
    }
}
