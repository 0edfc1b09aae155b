//! `-v` / `BIOGATE_LOG_LEVEL` verbosity handling.

use clap::{Arg, ArgAction, ArgMatches, Command, builder::ValueParser};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name or a numeric count from the environment. `-v`
/// occurrences also pass through here, so counts above 5 saturate.
fn parse_level(level: &str) -> Result<u8, String> {
    if let Ok(count) = level.parse::<u8>() {
        return Ok(count.min(5));
    }

    let level = level.to_lowercase();
    LEVEL_NAMES
        .iter()
        .position(|name| *name == level)
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {level}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("BIOGATE_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_level)),
    )
}

/// Tracing level requested on the command line; `None` keeps the default.
#[must_use]
pub fn level(matches: &ArgMatches) -> Option<Level> {
    match matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0) {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("error"), Ok(0));
        assert_eq!(parse_level("DEBUG"), Ok(3));
        assert_eq!(parse_level("5"), Ok(5));
        assert_eq!(parse_level("6"), Ok(5));
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn test_level_from_flags() -> Result<()> {
        temp_env::with_vars([("BIOGATE_LOG_LEVEL", None::<&str>)], || -> Result<()> {
            let command = || with_args(Command::new("biogate"));

            let matches = command().try_get_matches_from(vec!["biogate"])?;
            assert_eq!(level(&matches), None);

            let matches = command().try_get_matches_from(vec!["biogate", "-vv"])?;
            assert_eq!(level(&matches), Some(Level::INFO));

            let matches = command().try_get_matches_from(vec!["biogate", "-vvvvvvv"])?;
            assert_eq!(level(&matches), Some(Level::TRACE));
            Ok(())
        })
    }

    #[test]
    fn test_env_count_saturates() -> Result<()> {
        temp_env::with_vars([("BIOGATE_LOG_LEVEL", Some("9"))], || -> Result<()> {
            let matches =
                with_args(Command::new("biogate")).try_get_matches_from(vec!["biogate"])?;
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(5));
            assert_eq!(level(&matches), Some(Level::TRACE));
            Ok(())
        })
    }
}
