//! Screen targets and the navigation collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Onboarding,
    Login,
    Home,
}

impl Screen {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Onboarding => "onboarding",
            Self::Login => "login",
            Self::Home => "home",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-way hand-off to whatever renders screens.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, screen: Screen);
}

/// Navigator that logs and remembers every hand-off.
#[derive(Debug, Default)]
pub struct LogNavigator {
    history: Mutex<Vec<Screen>>,
}

impl LogNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Screen> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current(&self) -> Option<Screen> {
        self.history().last().copied()
    }
}

impl Navigator for LogNavigator {
    fn navigate_to(&self, screen: Screen) {
        info!(screen = %screen, "navigate");
        if let Ok(mut history) = self.history.lock() {
            history.push(screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_navigator_records_order() {
        let navigator = LogNavigator::new();
        assert_eq!(navigator.current(), None);

        navigator.navigate_to(Screen::Login);
        navigator.navigate_to(Screen::Home);

        assert_eq!(navigator.history(), vec![Screen::Login, Screen::Home]);
        assert_eq!(navigator.current(), Some(Screen::Home));
    }

    #[test]
    fn screen_serializes_snake_case() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&Screen::Onboarding)?, "\"onboarding\"");
        assert_eq!(Screen::Home.to_string(), "home");
        Ok(())
    }
}
