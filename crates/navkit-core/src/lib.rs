#![forbid(unsafe_code)]

//! Core: canonical navigation events, errors, scroll locking, and route tracking.

pub mod error;
pub mod event;
pub mod logging;
pub mod route;
pub mod scroll_lock;

pub use error::NavError;

#[cfg(feature = "tracing")]
pub use logging::debug;
#[cfg(feature = "tracing-json")]
pub use logging::install_json_subscriber;
