#![forbid(unsafe_code)]

//! The environment seam.
//!
//! A [`NavHost`] is everything the controller needs from the outside world:
//! environment reads, a host-driven event queue, listener and timer
//! registration, the router, and the scroll surface. The DOM binding and
//! the headless test host in `navkit-web` both implement it.
//!
//! Hosts never block. Time is whatever monotonic clock the host keeps; the
//! runtime only compares values it got from [`NavHost::now`].

use std::time::Duration;

use navkit_core::NavError;
use navkit_core::event::{HistoryMode, ListenerId, ListenerKind, NavEvent, TimerId};
use navkit_core::scroll_lock::ScrollSurface;

/// Host environment for a [`crate::NavRuntime`].
pub trait NavHost: ScrollSurface {
    /// Monotonic time.
    fn now(&self) -> Duration;

    /// Current viewport width in logical pixels.
    fn viewport_width(&self) -> u32;

    /// Path of the currently displayed page.
    fn current_path(&self) -> String;

    /// Pop the next queued event, if any. Must not block.
    fn poll_event(&mut self) -> Option<NavEvent>;

    /// Start delivering events of `kind`.
    fn add_listener(&mut self, kind: ListenerKind) -> Result<ListenerId, NavError>;

    /// Stop delivering events for a listener returned by `add_listener`.
    ///
    /// Unknown ids are ignored.
    fn remove_listener(&mut self, id: ListenerId);

    /// Arm a one-shot timer; its expiry is queued as
    /// [`NavEvent::TimerElapsed`].
    fn set_timer(&mut self, delay: Duration) -> Result<TimerId, NavError>;

    /// Disarm a timer. Unknown or already-fired ids are ignored.
    fn clear_timer(&mut self, id: TimerId);

    /// Ask the client-side router to navigate. Fire-and-forget: completion
    /// is reported later through a page-load event.
    fn navigate(&mut self, path: &str, history: HistoryMode) -> Result<(), NavError>;
}
