#![forbid(unsafe_code)]

//! Runtime configuration.
//!
//! Defaults reproduce the school site's menu: a 1024 px breakpoint, a 60 ms
//! resize debounce, `push` history, trailing slashes ignored, and the three
//! top-level links.
//!
//! Values can be overridden from the environment ([`NavConfig::from_env`])
//! or from a JSON options object ([`NavConfig::from_json`]).
//!
//! | Variable                | Field            | Format            |
//! |-------------------------|------------------|-------------------|
//! | `NAVKIT_BREAKPOINT_PX`  | `breakpoint_px`  | integer           |
//! | `NAVKIT_DEBOUNCE_MS`    | `debounce_ms`    | integer           |
//! | `NAVKIT_HISTORY`        | `history`        | `push`/`replace`  |
//! | `NAVKIT_LOG_DECISIONS`  | `enable_logging` | `1`/`0`/`true`/`false` |

use std::time::Duration;

use navkit_core::NavError;
use navkit_core::event::HistoryMode;
use navkit_core::route::{NavLink, TrailingSlash};
use navkit_layout::{DEFAULT_BREAKPOINT_PX, ViewportPolicy};
use serde::{Deserialize, Serialize};

use crate::controller::ControllerConfig;
use crate::debounce::{DEFAULT_DEBOUNCE, DebounceConfig};

const ENV_BREAKPOINT: &str = "NAVKIT_BREAKPOINT_PX";
const ENV_DEBOUNCE: &str = "NAVKIT_DEBOUNCE_MS";
const ENV_HISTORY: &str = "NAVKIT_HISTORY";
const ENV_LOG: &str = "NAVKIT_LOG_DECISIONS";

/// Configuration for a [`crate::NavRuntime`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Widths strictly above this are wide.
    pub breakpoint_px: u32,
    /// Resize debounce window in milliseconds.
    pub debounce_ms: u64,
    /// History handling for link navigation.
    pub history: HistoryMode,
    /// Route comparison policy.
    pub trailing_slash: TrailingSlash,
    /// Menu links in display order.
    pub links: Vec<NavLink>,
    /// Capture debouncer and transition decision logs.
    pub enable_logging: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: DEFAULT_BREAKPOINT_PX,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            history: HistoryMode::Push,
            trailing_slash: TrailingSlash::Never,
            links: default_links(),
            enable_logging: false,
        }
    }
}

fn default_links() -> Vec<NavLink> {
    vec![
        NavLink::new("Inicio", "/"),
        NavLink::new("Acerca de", "/about"),
        NavLink::new("Robótica", "/robotics"),
    ]
}

impl NavConfig {
    /// Set the breakpoint.
    #[must_use]
    pub fn with_breakpoint(mut self, px: u32) -> Self {
        self.breakpoint_px = px;
        self
    }

    /// Set the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debounce_ms = delay.as_millis() as u64;
        self
    }

    /// Set the history mode.
    #[must_use]
    pub fn with_history(mut self, history: HistoryMode) -> Self {
        self.history = history;
        self
    }

    /// Set the trailing-slash policy.
    #[must_use]
    pub fn with_trailing_slash(mut self, policy: TrailingSlash) -> Self {
        self.trailing_slash = policy;
        self
    }

    /// Replace the menu links.
    #[must_use]
    pub fn with_links(mut self, links: Vec<NavLink>) -> Self {
        self.links = links;
        self
    }

    /// Enable or disable decision logging.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Viewport policy.
    #[must_use]
    pub fn policy(&self) -> ViewportPolicy {
        ViewportPolicy::new(self.breakpoint_px)
    }

    /// Configuration for the state machine.
    #[must_use]
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            policy: self.policy(),
            history: self.history,
            trailing_slash: self.trailing_slash,
            enable_logging: self.enable_logging,
        }
    }

    /// Configuration for the resize debouncer.
    #[must_use]
    pub fn debouncer(&self) -> DebounceConfig {
        DebounceConfig::default()
            .with_delay(self.debounce())
            .with_logging(self.enable_logging)
    }

    /// Defaults overridden by `NAVKIT_*` environment variables.
    pub fn from_env() -> Result<Self, NavError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `get_env`.
    pub fn from_env_with<F>(get_env: F) -> Result<Self, NavError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = get_env(ENV_BREAKPOINT) {
            config.breakpoint_px = parse_int(ENV_BREAKPOINT, &raw)?;
        }
        if let Some(raw) = get_env(ENV_DEBOUNCE) {
            config.debounce_ms = parse_int(ENV_DEBOUNCE, &raw)?;
        }
        if let Some(raw) = get_env(ENV_HISTORY) {
            config.history = match raw.trim().to_ascii_lowercase().as_str() {
                "push" => HistoryMode::Push,
                "replace" => HistoryMode::Replace,
                _ => return Err(NavError::invalid_config(ENV_HISTORY, raw)),
            };
        }
        if let Some(raw) = get_env(ENV_LOG) {
            config.enable_logging = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => return Err(NavError::invalid_config(ENV_LOG, raw)),
            };
        }
        Ok(config)
    }

    /// Parse a JSON options object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, NavError> {
        serde_json::from_str(json).map_err(|err| NavError::invalid_config("options", err.to_string()))
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, NavError> {
    raw.trim()
        .parse()
        .map_err(|_| NavError::invalid_config(key, raw))
}
