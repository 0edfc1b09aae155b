use crate::cli::actions::{build_gate, terminal::Answer, terminal::TerminalPrompter};
use crate::cli::globals::GlobalArgs;
use crate::gate::credentials::Identity;
use crate::gate::login::LoginState;
use crate::gate::navigation::Screen;
use crate::gate::onboarding::{OnboardingProgress, STEPS};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub credentials: Option<Identity>,
    pub biometric_response: Answer,
    pub offer_response: Answer,
}

/// Run one cold start and return the screen the user ends up on.
/// # Errors
/// Returns an error if onboarding completion cannot be persisted.
#[instrument(skip(args), fields(state_file = %args.globals.state_file.display()))]
pub async fn run(args: Args) -> Result<Screen> {
    let (gate, navigator) = build_gate(&args.globals, args.biometric_response);

    let mut screen = gate.boot().await;

    if screen == Screen::Onboarding {
        let mut flow = gate.onboarding();
        loop {
            let step = flow.current();
            println!(
                "[{}/{}] {}: {}",
                flow.index() + 1,
                STEPS.len(),
                step.title,
                step.description
            );
            match flow
                .advance()
                .await
                .context("failed to complete onboarding")?
            {
                OnboardingProgress::Step(index) => debug!(index, "onboarding step"),
                OnboardingProgress::Completed => break,
            }
        }
        screen = Screen::Login;
    }

    if screen == Screen::Login {
        let prompter = Arc::new(TerminalPrompter::new(args.offer_response));
        let mut login = gate.login_screen(prompter);

        let mut state = login.mount().await;
        if state == LoginState::AwaitingManualInput {
            match &args.credentials {
                Some(identity) => state = login.submit(identity).await,
                None => println!("Credentials required: pass --email and --password"),
            }
        }
        login.teardown();
        debug!(?state, "login screen closed");
    }

    Ok(navigator.current().unwrap_or(screen))
}

/// Launch the app once from the terminal.
/// # Errors
/// Returns an error if the launch fails.
pub async fn execute(args: Args) -> Result<()> {
    let screen = run(args).await?;
    println!("Screen: {screen}");
    Ok(())
}
