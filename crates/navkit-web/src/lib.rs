#![forbid(unsafe_code)]

//! `navkit-web` binds the navigation runtime to a browser document.
//!
//! Design goals:
//! - **Host-driven I/O**: the document (or a test) pushes events; the
//!   runtime drains them in arrival order.
//! - **Deterministic time**: [`HeadlessHost`] advances a monotonic clock
//!   explicitly, so debounce behavior is reproducible.
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! On `wasm32` the crate exports `NavMenu` through `wasm-bindgen`; native
//! builds get a stub so the workspace checks on every target.

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::NavMenu;

use core::time::Duration;
use std::collections::VecDeque;

use navkit_core::NavError;
use navkit_core::event::{HistoryMode, ListenerId, ListenerKind, NavEvent, TimerId};
use navkit_core::scroll_lock::{Overflow, ScrollSurface};
use navkit_runtime::NavHost;

/// Native builds compile the JS export as a stub so `cargo check --workspace`
/// stays green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct NavMenu;

#[cfg(not(target_arch = "wasm32"))]
impl NavMenu {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

/// Run a link activation after suppressing the click's default action.
///
/// `suppress` always runs first, whatever `activate` returns, so the browser
/// never follows the link on its own.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn intercept_link<T, E>(
    suppress: impl FnOnce(),
    activate: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    suppress();
    activate()
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// An in-memory document.
///
/// Events are only delivered to registered listeners, once per listener, so
/// a leaked registration shows up as a duplicated event. Navigation behaves
/// like a client-side router: the request is recorded, the session history
/// updated, and the page-load signal queued for the next step.
#[derive(Debug)]
pub struct HeadlessHost {
    clock: DeterministicClock,
    width: u32,
    history: Vec<String>,
    cursor: usize,
    queue: VecDeque<NavEvent>,
    listeners: Vec<(ListenerId, ListenerKind)>,
    timers: Vec<(TimerId, Duration)>,
    has_body: bool,
    overflow: Option<Overflow>,
    overflow_writes: Vec<Overflow>,
    navigations: Vec<(String, HistoryMode)>,
    router_error: Option<String>,
    next_id: u64,
}

impl HeadlessHost {
    /// A document of the given width displaying `path`.
    #[must_use]
    pub fn new(width: u32, path: impl Into<String>) -> Self {
        Self {
            clock: DeterministicClock::new(),
            width,
            history: vec![path.into()],
            cursor: 0,
            queue: VecDeque::new(),
            listeners: Vec::new(),
            timers: Vec::new(),
            has_body: true,
            overflow: None,
            overflow_writes: Vec::new(),
            navigations: Vec::new(),
            router_error: None,
            next_id: 0,
        }
    }

    /// A document that has no `<body>` yet; scroll writes are dropped.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.has_body = false;
        self
    }

    /// Make every router call fail with `message`.
    pub fn fail_router(&mut self, message: impl Into<String>) {
        self.router_error = Some(message.into());
    }

    /// Resize the viewport, notifying resize listeners.
    pub fn resize(&mut self, width: u32) {
        self.width = width;
        self.deliver(ListenerKind::Resize, NavEvent::Resize { width });
    }

    /// Advance the clock by `dt`, queueing expiries for timers that came due
    /// (earliest first).
    pub fn advance(&mut self, dt: Duration) {
        self.clock.advance(dt);
        let now = self.clock.now();
        let mut due: Vec<_> = self
            .timers
            .iter()
            .copied()
            .filter(|(_, at)| *at <= now)
            .collect();
        due.sort_by_key(|(id, at)| (*at, *id));
        self.timers.retain(|(_, at)| *at > now);
        for (id, _) in due {
            self.queue.push_back(NavEvent::TimerElapsed(id));
        }
    }

    /// Fire the initial document-load signal.
    pub fn load_document(&mut self) {
        let path = self.current();
        self.deliver(ListenerKind::DomReady, NavEvent::PageLoad { path });
    }

    /// The shell's toggle button was pressed.
    pub fn press_toggle(&mut self) {
        self.queue.push_back(NavEvent::Toggle);
    }

    /// A menu link was clicked.
    pub fn click_link(&mut self, href: impl Into<String>) {
        self.queue.push_back(NavEvent::LinkActivate { href: href.into() });
    }

    /// The external owner asserted or withdrew the open value.
    pub fn set_controlled(&mut self, open: Option<bool>) {
        self.queue.push_back(NavEvent::ControlledOpen(open));
    }

    /// Browser back button. Returns `false` at the start of history.
    pub fn go_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.page_loaded();
        true
    }

    /// Browser forward button. Returns `false` at the end of history.
    pub fn go_forward(&mut self) -> bool {
        if self.cursor + 1 >= self.history.len() {
            return false;
        }
        self.cursor += 1;
        self.page_loaded();
        true
    }

    /// Current time.
    #[must_use]
    pub fn clock(&self) -> &DeterministicClock {
        &self.clock
    }

    /// Current viewport width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Body overflow as last written (`None` if never written).
    #[must_use]
    pub fn overflow(&self) -> Option<Overflow> {
        self.overflow
    }

    /// Every overflow write, in order.
    #[must_use]
    pub fn overflow_writes(&self) -> &[Overflow] {
        &self.overflow_writes
    }

    /// Every router request, in order.
    #[must_use]
    pub fn navigations(&self) -> &[(String, HistoryMode)] {
        &self.navigations
    }

    /// Session history entries.
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of live listeners of `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.listeners.iter().filter(|(_, k)| *k == kind).count()
    }

    /// Number of live listeners.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of queued, undelivered events.
    #[must_use]
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    fn current(&self) -> String {
        self.history.get(self.cursor).cloned().unwrap_or_else(|| "/".to_owned())
    }

    fn page_loaded(&mut self) {
        let path = self.current();
        self.deliver(ListenerKind::PageLoad, NavEvent::PageLoad { path });
    }

    fn deliver(&mut self, kind: ListenerKind, event: NavEvent) {
        let copies = self.listener_count(kind);
        if copies == 0 {
            tracing::trace!(
                target: "navkit.web",
                event = event.name(),
                "no listener; event dropped"
            );
        }
        for _ in 0..copies {
            self.queue.push_back(event.clone());
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ScrollSurface for HeadlessHost {
    fn apply_overflow(&mut self, overflow: Overflow) {
        if !self.has_body {
            return;
        }
        self.overflow = Some(overflow);
        self.overflow_writes.push(overflow);
    }
}

impl NavHost for HeadlessHost {
    fn now(&self) -> Duration {
        self.clock.now()
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn current_path(&self) -> String {
        self.current()
    }

    fn poll_event(&mut self) -> Option<NavEvent> {
        self.queue.pop_front()
    }

    fn add_listener(&mut self, kind: ListenerKind) -> Result<ListenerId, NavError> {
        let id = ListenerId(self.next_id());
        self.listeners.push((id, kind));
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }

    fn set_timer(&mut self, delay: Duration) -> Result<TimerId, NavError> {
        let id = TimerId(self.next_id());
        self.timers.push((id, self.clock.now().saturating_add(delay)));
        Ok(id)
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.timers.retain(|(t, _)| *t != id);
    }

    fn navigate(&mut self, path: &str, history: HistoryMode) -> Result<(), NavError> {
        if let Some(message) = &self.router_error {
            return Err(NavError::Host(message.clone()));
        }
        self.navigations.push((path.to_owned(), history));
        match history {
            HistoryMode::Push => {
                self.history.truncate(self.cursor + 1);
                self.history.push(path.to_owned());
                self.cursor = self.history.len() - 1;
            }
            HistoryMode::Replace => {
                if let Some(entry) = self.history.get_mut(self.cursor) {
                    *entry = path.to_owned();
                }
            }
        }
        tracing::debug!(target: "navkit.web", path, history = history.as_str(), "router navigated");
        self.page_loaded();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn clock_advances_and_saturates() {
        let mut clock = DeterministicClock::new();
        clock.advance(ms(10));
        assert_eq!(clock.now(), ms(10));
        clock.set(Duration::MAX);
        clock.advance(ms(1));
        assert_eq!(clock.now(), Duration::MAX);
    }

    #[test]
    fn events_need_a_listener() {
        let mut host = HeadlessHost::new(800, "/");
        host.resize(900);
        assert_eq!(host.queued_events(), 0);
        assert_eq!(host.width(), 900);

        host.add_listener(ListenerKind::Resize).unwrap();
        host.resize(1000);
        assert_eq!(host.poll_event(), Some(NavEvent::Resize { width: 1000 }));
    }

    #[test]
    fn duplicate_listeners_duplicate_events() {
        let mut host = HeadlessHost::new(800, "/");
        host.add_listener(ListenerKind::Resize).unwrap();
        host.add_listener(ListenerKind::Resize).unwrap();
        host.resize(1000);
        assert_eq!(host.queued_events(), 2);
    }

    #[test]
    fn timers_fire_in_due_order_and_can_be_cleared() {
        let mut host = HeadlessHost::new(800, "/");
        let late = host.set_timer(ms(50)).unwrap();
        let early = host.set_timer(ms(20)).unwrap();
        let cleared = host.set_timer(ms(10)).unwrap();
        host.clear_timer(cleared);
        host.advance(ms(30));
        assert_eq!(host.poll_event(), Some(NavEvent::TimerElapsed(early)));
        assert_eq!(host.poll_event(), None);
        host.advance(ms(20));
        assert_eq!(host.poll_event(), Some(NavEvent::TimerElapsed(late)));
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn navigation_updates_history_and_queues_page_load() {
        let mut host = HeadlessHost::new(800, "/");
        host.add_listener(ListenerKind::PageLoad).unwrap();
        host.navigate("/about", HistoryMode::Push).unwrap();
        host.navigate("/robotics", HistoryMode::Replace).unwrap();
        assert_eq!(host.history(), ["/".to_owned(), "/robotics".to_owned()]);
        assert_eq!(host.current_path(), "/robotics");
        assert_eq!(
            host.poll_event(),
            Some(NavEvent::PageLoad {
                path: "/about".into()
            })
        );
    }

    #[test]
    fn back_and_forward_walk_history() {
        let mut host = HeadlessHost::new(800, "/");
        host.navigate("/about", HistoryMode::Push).unwrap();
        assert!(host.go_back());
        assert_eq!(host.current_path(), "/");
        assert!(!host.go_back());
        assert!(host.go_forward());
        assert_eq!(host.current_path(), "/about");
        assert!(!host.go_forward());
    }

    #[test]
    fn push_after_back_truncates_forward_entries() {
        let mut host = HeadlessHost::new(800, "/");
        host.navigate("/about", HistoryMode::Push).unwrap();
        host.go_back();
        host.navigate("/robotics", HistoryMode::Push).unwrap();
        assert_eq!(host.history(), ["/".to_owned(), "/robotics".to_owned()]);
    }

    #[test]
    fn body_less_document_ignores_overflow() {
        let mut host = HeadlessHost::new(800, "/").without_body();
        host.apply_overflow(Overflow::Hidden);
        assert_eq!(host.overflow(), None);
        assert!(host.overflow_writes().is_empty());
    }

    #[test]
    fn link_default_is_suppressed_even_when_activation_fails() {
        let mut host = HeadlessHost::new(800, "/");
        host.fail_router("offline");
        let mut suppressed = false;
        let result = intercept_link(
            || suppressed = true,
            || host.navigate("/about", HistoryMode::Push),
        );
        assert!(suppressed);
        assert_eq!(result, Err(NavError::Host("offline".into())));
    }

    #[test]
    fn router_failure_is_reported() {
        let mut host = HeadlessHost::new(800, "/");
        host.fail_router("offline");
        assert_eq!(
            host.navigate("/about", HistoryMode::Push),
            Err(NavError::Host("offline".into()))
        );
        assert!(host.navigations().is_empty());
    }
}
