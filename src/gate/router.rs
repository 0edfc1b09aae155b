//! Cold-start routing.
//!
//! The initial screen is a pure function of three persisted flags. When the
//! biometric preference is on, the login screen wins even over a valid session
//! token so every cold start is re-challenged. Keep the check order as it is:
//! testing the session token first would skip that re-challenge.

use super::navigation::{Navigator, Screen};
use super::session::SessionManager;
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BootFlags {
    pub onboarding_complete: bool,
    pub biometric_enabled: bool,
    pub session_present: bool,
}

#[must_use]
pub const fn initial_screen(flags: BootFlags) -> Screen {
    if !flags.onboarding_complete {
        Screen::Onboarding
    } else if flags.biometric_enabled {
        Screen::Login
    } else if flags.session_present {
        Screen::Home
    } else {
        Screen::Login
    }
}

/// Read the flags, degrading unreadable ones to unset.
pub async fn read_flags(session: &SessionManager) -> BootFlags {
    BootFlags {
        onboarding_complete: session.is_onboarding_complete().await,
        biometric_enabled: session.is_biometric_enabled().await,
        session_present: session.is_logged_in().await,
    }
}

/// Compute the initial screen and hand it to the navigator.
pub async fn boot(session: &SessionManager, navigator: &dyn Navigator) -> Screen {
    let flags = read_flags(session).await;
    let screen = initial_screen(flags);
    info!(
        onboarding_complete = flags.onboarding_complete,
        biometric_enabled = flags.biometric_enabled,
        session_present = flags.session_present,
        screen = %screen,
        "boot"
    );
    navigator.navigate_to(screen);
    screen
}
