use crate::cli::actions::{build_gate, terminal::Answer};
use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use tracing::info;

/// End the persisted session and return to the login screen.
/// # Errors
/// Returns an error if the session token cannot be removed.
pub async fn logout(globals: GlobalArgs) -> Result<()> {
    let (gate, _) = build_gate(&globals, Answer::No);
    if !gate.session().is_logged_in().await {
        println!("No active session");
        return Ok(());
    }

    let screen = gate.logout().await.context("logout failed")?;
    println!("Logged out; next screen: {screen}");
    Ok(())
}

/// Turn the biometric login shortcut off. Enabling only happens after a
/// credential login on the login screen.
/// # Errors
/// Returns an error if the preference cannot be written.
pub async fn disable_biometrics(globals: GlobalArgs) -> Result<()> {
    let (gate, _) = build_gate(&globals, Answer::No);
    gate.session()
        .set_biometric_enabled(false)
        .await
        .context("failed to disable biometrics")?;
    info!("Biometric login disabled");
    println!("Biometric login disabled");
    Ok(())
}
