#![forbid(unsafe_code)]

//! Runtime for the responsive navigation menu.
//!
//! - [`controller`]: the pure menu state machine.
//! - [`debounce`]: trailing-edge resize debouncer.
//! - [`subscription`]: scoped listener registration.
//! - [`host`]: the [`NavHost`] environment seam.
//! - [`runtime`]: [`NavRuntime`], which drives all of the above.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod host;
pub mod runtime;
pub mod subscription;

#[cfg(test)]
pub(crate) mod testing;

pub use config::NavConfig;
pub use controller::{
    ControlInput, ControllerConfig, Effect, MenuController, MenuNotice, Transition,
    TransitionRecord,
};
pub use debounce::{DebounceConfig, DebounceFire, DebounceStats, ResizeDebouncer};
pub use host::NavHost;
pub use runtime::{LinkOutcome, LinkState, NavRuntime, Notifier, StepResult};
pub use subscription::{ListenerRegistry, Registration};
