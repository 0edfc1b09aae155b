//! Terminal host for the login screen: prompts on stdin and a simulated sensor.

use crate::cli::globals::Sensor;
use crate::gate::biometrics::{BiometricProvider, Capability};
use crate::gate::login::LoginPrompter;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Scripted or interactive answer to a yes/no question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Ask,
}

impl Answer {
    /// Parse a command-line answer. `approve`/`reject` are sensor aliases.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "yes" | "approve" => Some(Self::Yes),
            "no" | "reject" => Some(Self::No),
            "ask" => Some(Self::Ask),
            _ => None,
        }
    }

    async fn resolve(self, question: &str) -> bool {
        match self {
            Self::Yes => true,
            Self::No => false,
            Self::Ask => ask(question).await,
        }
    }
}

fn affirmative(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Ask a yes/no question on the terminal. EOF or a read error means "no".
async fn ask(question: &str) -> bool {
    eprint!("{question} [y/N] ");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(Some(line)) => affirmative(&line),
        Ok(None) => false,
        Err(err) => {
            warn!("Could not read answer: {err}");
            false
        }
    }
}

#[derive(Debug)]
pub struct TerminalPrompter {
    offer: Answer,
}

impl TerminalPrompter {
    #[must_use]
    pub fn new(offer: Answer) -> Self {
        Self { offer }
    }
}

#[async_trait]
impl LoginPrompter for TerminalPrompter {
    fn invalid_credentials(&self) {
        eprintln!("Invalid email or password");
    }

    async fn offer_biometrics(&self) -> bool {
        self.offer
            .resolve("Enable biometric login for next time?")
            .await
    }
}

/// Biometric sensor driven by command-line flags.
#[derive(Debug)]
pub struct SimulatedSensor {
    sensor: Sensor,
    response: Answer,
}

impl SimulatedSensor {
    #[must_use]
    pub fn new(sensor: Sensor, response: Answer) -> Self {
        Self { sensor, response }
    }
}

#[async_trait]
impl BiometricProvider for SimulatedSensor {
    async fn query_capability(&self) -> Capability {
        self.sensor.capability()
    }

    async fn challenge(&self, prompt: &str) -> bool {
        debug!(sensor = ?self.sensor, "biometric challenge");
        if !self.sensor.capability().usable() {
            return false;
        }
        self.response
            .resolve(&format!("{prompt}: approve biometric scan?"))
            .await
    }
}
