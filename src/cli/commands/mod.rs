pub mod logging;

use crate::gate::login::DEFAULT_BIOMETRIC_PROMPT;
use crate::gate::store::DEFAULT_STATE_FILE;
use clap::{
    Arg, ColorChoice, Command,
    builder::PossibleValuesParser,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_STATE_FILE: &str = "state-file";
pub const ARG_SECURE_STORE: &str = "secure-store";
pub const ARG_CHALLENGE_TIMEOUT: &str = "challenge-timeout";
pub const ARG_PROMPT: &str = "prompt";
pub const ARG_SENSOR: &str = "sensor";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_BIOMETRIC_RESPONSE: &str = "biometric-response";
pub const ARG_ACCEPT_OFFER: &str = "accept-biometric-offer";

pub const CMD_STATUS: &str = "status";
pub const CMD_LAUNCH: &str = "launch";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_DISABLE_BIOMETRICS: &str = "disable-biometrics";

fn launch() -> Command {
    Command::new(CMD_LAUNCH)
        .about("Cold start: route, onboard, and log in")
        .arg(
            Arg::new(ARG_EMAIL)
                .long("email")
                .help("Email to submit if the login screen falls back to credentials")
                .env("BIOGATE_EMAIL")
                .requires(ARG_PASSWORD),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long("password")
                .help("Password to submit together with --email")
                .env("BIOGATE_PASSWORD")
                .hide_env_values(true)
                .requires(ARG_EMAIL),
        )
        .arg(
            Arg::new(ARG_BIOMETRIC_RESPONSE)
                .long("biometric-response")
                .help("How the simulated sensor answers a challenge")
                .env("BIOGATE_BIOMETRIC_RESPONSE")
                .default_value("ask")
                .value_parser(PossibleValuesParser::new(["approve", "reject", "ask"])),
        )
        .arg(
            Arg::new(ARG_ACCEPT_OFFER)
                .long("accept-biometric-offer")
                .help("Answer to the offer to enable biometric login")
                .env("BIOGATE_ACCEPT_BIOMETRIC_OFFER")
                .default_value("ask")
                .value_parser(PossibleValuesParser::new(["yes", "no", "ask"])),
        )
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("biogate")
        .about("Session and access gate")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new(ARG_STATE_FILE)
                .long("state-file")
                .help("Path of the persisted flag store")
                .env("BIOGATE_STATE_FILE")
                .default_value(DEFAULT_STATE_FILE)
                .global(true),
        )
        .arg(
            Arg::new(ARG_SECURE_STORE)
                .long("secure-store")
                .help("Secure store for the biometric preference, falling back to --state-file")
                .env("BIOGATE_SECURE_STORE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_CHALLENGE_TIMEOUT)
                .long("challenge-timeout")
                .help("Seconds before a pending biometric challenge counts as failed")
                .env("BIOGATE_CHALLENGE_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_PROMPT)
                .long("prompt")
                .help("Text shown by the biometric prompt")
                .env("BIOGATE_PROMPT")
                .default_value(DEFAULT_BIOMETRIC_PROMPT)
                .global(true),
        )
        .arg(
            Arg::new(ARG_SENSOR)
                .long("sensor")
                .help("Simulated biometric sensor: enrolled, not-enrolled, absent")
                .env("BIOGATE_SENSOR")
                .default_value("enrolled")
                .global(true)
                .value_parser(PossibleValuesParser::new(["enrolled", "not-enrolled", "absent"])),
        )
        .subcommand(Command::new(CMD_STATUS).about("Show persisted flags and the boot target"))
        .subcommand(launch())
        .subcommand(Command::new(CMD_LOGOUT).about("End the current session"))
        .subcommand(
            Command::new(CMD_DISABLE_BIOMETRICS).about("Turn the biometric login shortcut off"),
        );

    logging::with_args(command)
}
