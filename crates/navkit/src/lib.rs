#![forbid(unsafe_code)]

//! navkit public facade crate.
//!
//! Re-exports the types most applications need from the internal crates
//! and offers a small prelude.
//!
//! ```ignore
//! use navkit::prelude::*;
//!
//! let mut menu = NavRuntime::new(NavConfig::default(), HeadlessHost::new(800, "/"));
//! menu.mount()?;
//! menu.toggle()?;
//! assert_eq!(menu.layout(), MenuLayout::OverlayColumn);
//! ```

// --- Core re-exports -------------------------------------------------------

pub use navkit_core::NavError;
pub use navkit_core::event::{HistoryMode, ListenerKind, ListenerKinds, NavEvent, TimerId};
pub use navkit_core::route::{ActiveRoute, LinkAppearance, NavLink, TrailingSlash};
pub use navkit_core::scroll_lock::{Overflow, ScrollLock, ScrollSurface};

// --- Layout re-exports -----------------------------------------------------

pub use navkit_layout::{MenuLayout, MenuState, ViewportClass, ViewportPolicy, classify};

// --- Runtime re-exports ----------------------------------------------------

pub use navkit_runtime::{
    LinkOutcome, LinkState, MenuController, MenuNotice, NavConfig, NavHost, NavRuntime,
    StepResult,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use navkit_web::{DeterministicClock, HeadlessHost, NavMenu};

#[cfg(feature = "tracing-json")]
pub use navkit_core::install_json_subscriber;

/// Standard result type for navkit APIs.
pub type Result<T> = std::result::Result<T, NavError>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        MenuLayout, MenuState, NavConfig, NavError, NavHost, NavRuntime, Result, ViewportClass,
    };

    #[cfg(feature = "web")]
    pub use crate::HeadlessHost;

    pub use crate::{core, layout, runtime};
}

pub use navkit_core as core;
pub use navkit_layout as layout;
pub use navkit_runtime as runtime;
