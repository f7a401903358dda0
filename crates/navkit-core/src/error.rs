#![forbid(unsafe_code)]

//! Error type shared by every navkit crate.
//!
//! The controller itself has no recoverable failure modes: widths and paths
//! are always well formed. Errors only arise at the edges, when a host cannot
//! register a listener, arm a timer, or reach the router, or when a
//! configuration value cannot be parsed.

use std::fmt;

/// Errors surfaced by hosts and configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    /// The host does not support the requested operation.
    Unsupported(&'static str),
    /// A required document element (window, document, body) is missing.
    MissingElement(&'static str),
    /// A configuration value could not be parsed.
    InvalidConfig {
        /// Configuration key (environment variable or JSON field).
        key: String,
        /// The offending raw value.
        value: String,
    },
    /// The host reported a failure (e.g. a JS exception from the router).
    Host(String),
    /// The operation requires a mounted controller.
    NotMounted,
}

impl NavError {
    /// Build an [`NavError::InvalidConfig`] from a key and raw value.
    #[must_use]
    pub fn invalid_config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for NavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
            Self::MissingElement(what) => write!(f, "missing element: {what}"),
            Self::InvalidConfig { key, value } => {
                write!(f, "invalid config value for {key}: {value:?}")
            }
            Self::Host(msg) => write!(f, "host error: {msg}"),
            Self::NotMounted => f.write_str("navigation controller is not mounted"),
        }
    }
}

impl std::error::Error for NavError {}
