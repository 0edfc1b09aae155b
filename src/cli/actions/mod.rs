pub mod launch;
pub mod session;
pub mod status;
pub mod terminal;

mod run;

use crate::cli::globals::GlobalArgs;
use crate::gate::Gate;
use crate::gate::credentials::StaticCredentialVerifier;
use crate::gate::navigation::LogNavigator;
use crate::gate::store::{FallbackFlagStore, FileFlagStore, FlagStore};
use std::sync::Arc;
use terminal::{Answer, SimulatedSensor};

#[derive(Debug)]
pub enum Action {
    Status(GlobalArgs),
    Launch(launch::Args),
    Logout(GlobalArgs),
    DisableBiometrics(GlobalArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}

fn flag_store(globals: &GlobalArgs) -> Arc<dyn FlagStore> {
    let state: Arc<dyn FlagStore> = Arc::new(FileFlagStore::new(globals.state_file.clone()));
    match &globals.secure_store {
        Some(secure) => Arc::new(FallbackFlagStore::new(
            Arc::new(FileFlagStore::new(secure.clone())),
            state,
        )),
        None => state,
    }
}

/// Wire a gate over the state file with the simulated sensor.
pub(crate) fn build_gate(globals: &GlobalArgs, response: Answer) -> (Gate, Arc<LogNavigator>) {
    let navigator = Arc::new(LogNavigator::new());
    let gate = Gate::new(
        globals.gate_config(),
        flag_store(globals),
        Arc::new(StaticCredentialVerifier::default()),
        Arc::new(SimulatedSensor::new(globals.sensor, response)),
        navigator.clone(),
    );
    (gate, navigator)
}
