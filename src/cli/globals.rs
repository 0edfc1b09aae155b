use crate::gate::GateConfig;
use crate::gate::biometrics::Capability;
use std::path::PathBuf;
use std::time::Duration;

/// Simulated biometric sensor for the command-line host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sensor {
    Enrolled,
    NotEnrolled,
    Absent,
}

impl Sensor {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "enrolled" => Some(Self::Enrolled),
            "not-enrolled" => Some(Self::NotEnrolled),
            "absent" | "none" => Some(Self::Absent),
            _ => None,
        }
    }

    #[must_use]
    pub const fn capability(self) -> Capability {
        match self {
            Self::Enrolled => Capability {
                hardware_present: true,
                enrolled: true,
            },
            Self::NotEnrolled => Capability {
                hardware_present: true,
                enrolled: false,
            },
            Self::Absent => Capability {
                hardware_present: false,
                enrolled: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub state_file: PathBuf,
    /// Optional secure medium for the biometric preference.
    pub secure_store: Option<PathBuf>,
    pub challenge_timeout: Option<Duration>,
    pub prompt: String,
    pub sensor: Sensor,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(state_file: PathBuf) -> Self {
        Self {
            state_file,
            secure_store: None,
            challenge_timeout: None,
            prompt: crate::gate::login::DEFAULT_BIOMETRIC_PROMPT.to_string(),
            sensor: Sensor::Enrolled,
        }
    }

    #[must_use]
    pub fn gate_config(&self) -> GateConfig {
        GateConfig::new()
            .with_biometric_prompt(self.prompt.clone())
            .with_challenge_timeout(self.challenge_timeout)
    }
}
