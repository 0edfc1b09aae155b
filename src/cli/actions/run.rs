use crate::cli::actions::{Action, launch, session, status};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Status(globals) => status::execute(globals).await,
        Action::Launch(args) => launch::execute(args).await,
        Action::Logout(globals) => session::logout(globals).await,
        Action::DisableBiometrics(globals) => session::disable_biometrics(globals).await,
    }
}
