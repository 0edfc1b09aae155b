//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary executes.

use crate::cli::actions::{Action, launch, terminal::Answer};
use crate::cli::commands::{
    ARG_ACCEPT_OFFER, ARG_BIOMETRIC_RESPONSE, ARG_CHALLENGE_TIMEOUT, ARG_EMAIL, ARG_PASSWORD,
    ARG_PROMPT, ARG_SECURE_STORE, ARG_SENSOR, ARG_STATE_FILE, CMD_DISABLE_BIOMETRICS, CMD_LAUNCH,
    CMD_LOGOUT, CMD_STATUS,
};
use crate::cli::globals::{GlobalArgs, Sensor};
use crate::gate::credentials::Identity;
use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use std::time::Duration;

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let state_file = matches
        .get_one::<String>(ARG_STATE_FILE)
        .map(PathBuf::from)
        .context("missing required argument: --state-file")?;

    let mut globals = GlobalArgs::new(state_file);
    globals.secure_store = matches.get_one::<String>(ARG_SECURE_STORE).map(PathBuf::from);
    globals.challenge_timeout = matches
        .get_one::<u64>(ARG_CHALLENGE_TIMEOUT)
        .copied()
        .map(Duration::from_secs);
    if let Some(prompt) = matches.get_one::<String>(ARG_PROMPT) {
        globals.prompt.clone_from(prompt);
    }
    if let Some(sensor) = matches.get_one::<String>(ARG_SENSOR) {
        globals.sensor =
            Sensor::parse(sensor).ok_or_else(|| anyhow!("invalid --sensor value: {sensor}"))?;
    }

    Ok(globals)
}

fn answer(matches: &clap::ArgMatches, name: &str) -> Result<Answer> {
    let value = matches
        .get_one::<String>(name)
        .map_or("ask", String::as_str);
    Answer::parse(value).ok_or_else(|| anyhow!("invalid --{name} value: {value}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some((CMD_STATUS, _)) => Ok(Action::Status(globals)),
        Some((CMD_LOGOUT, _)) => Ok(Action::Logout(globals)),
        Some((CMD_DISABLE_BIOMETRICS, _)) => Ok(Action::DisableBiometrics(globals)),
        Some((CMD_LAUNCH, sub_m)) => {
            let credentials = match (
                sub_m.get_one::<String>(ARG_EMAIL),
                sub_m.get_one::<String>(ARG_PASSWORD),
            ) {
                (Some(email), Some(password)) => Some(Identity::new(email, password)),
                _ => None,
            };

            Ok(Action::Launch(launch::Args {
                globals,
                credentials,
                biometric_response: answer(sub_m, ARG_BIOMETRIC_RESPONSE)?,
                offer_response: answer(sub_m, ARG_ACCEPT_OFFER)?,
            }))
        }
        _ => Err(anyhow!("missing subcommand")),
    }
}
