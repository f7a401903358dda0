#![forbid(unsafe_code)]

//! Logging for the core crate.
//!
//! With the `tracing` feature the core emits `debug` events through
//! `tracing`; without it a no-op `debug!` keeps call sites compiling and
//! `tracing` stays out of the dependency graph.
//!
//! `tracing-json` adds [`install_json_subscriber`] for hosts that want
//! machine-readable logs.

#[cfg(feature = "tracing")]
pub use tracing::debug;

#[cfg(not(feature = "tracing"))]
mod noop {
    /// Discards its arguments when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
}

/// Install a global JSON subscriber filtered by `RUST_LOG`, falling back to
/// `navkit=info` when the variable is unset or invalid.
///
/// Returns `false` when a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn install_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("navkit=info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
