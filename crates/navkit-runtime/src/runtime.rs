#![forbid(unsafe_code)]

//! Host-driven, non-blocking menu runtime.
//!
//! [`NavRuntime`] ties the pieces together: it registers listeners on a
//! [`NavHost`], drains host events, feeds resize signals through the
//! [`ResizeDebouncer`], applies inputs to the [`MenuController`], and
//! executes the resulting effects against the host.
//!
//! # Lifecycle
//!
//! 1. [`NavRuntime::new`] with a configuration and a host.
//! 2. [`NavRuntime::mount`] registers listeners, commits the current path,
//!    and classifies the current width.
//! 3. [`NavRuntime::step`] whenever the host has queued events. Direct
//!    calls (`toggle`, `activate_link`, `set_controlled_open`) drain the
//!    queue first so inputs are always applied in arrival order.
//! 4. [`NavRuntime::unmount`] (or drop) cancels the pending timer, removes
//!    every listener, and releases the scroll lock.

use std::fmt;

use navkit_core::NavError;
use navkit_core::event::{ListenerKinds, NavEvent};
use navkit_core::route::{LinkAppearance, NavLink};
use navkit_core::scroll_lock::ScrollLock;
use navkit_layout::{MenuLayout, MenuState, ViewportClass};

use crate::config::NavConfig;
use crate::controller::{ControlInput, Effect, MenuController, MenuNotice, Transition};
use crate::debounce::ResizeDebouncer;
use crate::host::NavHost;
use crate::subscription::ListenerRegistry;

/// Callback receiving every state report.
pub type Notifier = Box<dyn FnMut(&MenuNotice)>;

/// Outcome of a single [`NavRuntime::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the runtime is mounted.
    pub mounted: bool,
    /// Host events drained during this step.
    pub events_processed: u32,
    /// Inputs that changed the menu state or the viewport class.
    pub transitions: u32,
}

/// Outcome of a link activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// The link's default full-page navigation must be suppressed.
    pub default_prevented: bool,
    /// The compact overlay was open and has been closed.
    pub closed_overlay: bool,
    /// Path handed to the router.
    pub navigated_to: Option<String>,
}

/// A link paired with how it should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState<'a> {
    /// The configured link.
    pub link: &'a NavLink,
    /// Active or inactive.
    pub appearance: LinkAppearance,
}

/// The mounted navigation region.
pub struct NavRuntime<H: NavHost> {
    config: NavConfig,
    host: H,
    controller: MenuController,
    debouncer: ResizeDebouncer,
    scroll: ScrollLock,
    listeners: ListenerRegistry,
    notifier: Option<Notifier>,
    mounted: bool,
}

impl<H: NavHost> fmt::Debug for NavRuntime<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavRuntime")
            .field("mounted", &self.mounted)
            .field("state", &self.controller.state())
            .field("class", &self.controller.class())
            .field("scroll_locked", &self.scroll.is_locked())
            .field("listeners", &self.listeners.active_count())
            .finish_non_exhaustive()
    }
}

impl<H: NavHost> NavRuntime<H> {
    /// Create an unmounted runtime.
    pub fn new(config: NavConfig, host: H) -> Self {
        Self {
            controller: MenuController::new(config.controller()),
            debouncer: ResizeDebouncer::new(config.debouncer()),
            config,
            host,
            scroll: ScrollLock::new(),
            listeners: ListenerRegistry::new(),
            notifier: None,
            mounted: false,
        }
    }

    /// Install the shell callback.
    #[must_use]
    pub fn with_notifier<F>(mut self, notifier: F) -> Self
    where
        F: FnMut(&MenuNotice) + 'static,
    {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Mount the region.
    ///
    /// A prior mount is torn down first, so remounting never leaves more
    /// than one listener per kind. If listener registration fails, every
    /// listener registered so far is removed and the runtime stays
    /// unmounted.
    pub fn mount(&mut self) -> Result<(), NavError> {
        if self.mounted {
            self.unmount();
        }
        self.controller = MenuController::new(self.config.controller());

        if let Err(err) = self.listeners.reconcile(&mut self.host, ListenerKinds::all()) {
            tracing::warn!(
                target: "navkit.menu",
                error = %err,
                "listener registration failed; mount aborted"
            );
            self.listeners.clear(&mut self.host);
            return Err(err);
        }
        self.mounted = true;

        let path = self.host.current_path();
        self.apply(ControlInput::PageLoaded { path })?;
        let width = self.host.viewport_width();
        self.apply(ControlInput::Measure { width })?;

        tracing::info!(
            target: "navkit.menu",
            width,
            class = self.viewport_class().label(),
            route = %self.active_route(),
            "navigation mounted"
        );
        Ok(())
    }

    /// Drain queued host events.
    ///
    /// Every queued event is processed even if an earlier one fails; each
    /// failure is logged and the first is returned once the queue is empty.
    /// While unmounted, queued events are discarded.
    pub fn step(&mut self) -> Result<StepResult, NavError> {
        let (result, first_err) = self.drain();
        match first_err {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }

    /// Flip the menu (the shell's toggle button).
    ///
    /// Queued events are drained first. A failure among them is logged by
    /// the drain and does not prevent the toggle.
    pub fn toggle(&mut self) -> Result<Transition, NavError> {
        self.ensure_mounted()?;
        self.drain();
        self.apply(ControlInput::Toggle)
    }

    /// Assert (`Some`) or withdraw (`None`) the controlled-open value.
    pub fn set_controlled_open(&mut self, open: Option<bool>) -> Result<Transition, NavError> {
        self.ensure_mounted()?;
        self.drain();
        self.apply(ControlInput::Controlled(open))
    }

    /// Intercept a link click.
    ///
    /// The default action is always suppressed. In compact mode the overlay
    /// closes before the router is asked to navigate.
    pub fn activate_link(&mut self, href: &str) -> Result<LinkOutcome, NavError> {
        self.ensure_mounted()?;
        self.drain();
        let t = self.apply(ControlInput::LinkActivated {
            href: href.to_owned(),
        })?;
        Ok(LinkOutcome {
            default_prevented: t.effects.contains(&Effect::PreventDefault),
            closed_overlay: t.closed_menu() && t.class_to == Some(ViewportClass::Compact),
            navigated_to: t.navigation().map(str::to_owned),
        })
    }

    /// Tear the region down. Never fails; safe to call repeatedly.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        let now = self.host.now();
        if let Some(timer) = self.debouncer.cancel(now) {
            self.host.clear_timer(timer);
        }
        self.listeners.clear(&mut self.host);
        self.controller.apply(ControlInput::Teardown);
        self.scroll.force_release(&mut self.host);
        self.mounted = false;
        tracing::info!(target: "navkit.menu", "navigation unmounted");
    }

    /// Whether the region is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether `path` is the committed route.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.controller.is_active(path)
    }

    /// Resolved presentation.
    #[must_use]
    pub fn layout(&self) -> MenuLayout {
        self.controller.layout()
    }

    /// Configured links with their appearance, in display order.
    pub fn link_states(&self) -> impl Iterator<Item = LinkState<'_>> + '_ {
        let route = self.controller.route();
        self.config.links.iter().map(move |link| LinkState {
            link,
            appearance: LinkAppearance::of(link, route),
        })
    }

    /// Current menu state.
    #[must_use]
    pub fn menu_state(&self) -> MenuState {
        self.controller.state()
    }

    /// Current viewport class; before the first measurement the wide
    /// presentation applies.
    #[must_use]
    pub fn viewport_class(&self) -> ViewportClass {
        self.controller.class().unwrap_or(ViewportClass::Wide)
    }

    /// Last committed route.
    #[must_use]
    pub fn active_route(&self) -> &str {
        self.controller.route().current()
    }

    /// Route requested but not yet confirmed by a page load.
    #[must_use]
    pub fn pending_route(&self) -> Option<&str> {
        self.controller.route().pending()
    }

    /// Whether this runtime holds the document scroll lock.
    #[must_use]
    pub fn scroll_locked(&self) -> bool {
        self.scroll.is_locked()
    }

    /// Snapshot of the state reported to the shell.
    #[must_use]
    pub fn notice(&self) -> MenuNotice {
        self.controller.notice()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// The state machine (records, controlled value).
    #[must_use]
    pub fn controller(&self) -> &MenuController {
        &self.controller
    }

    /// The resize debouncer (stats, decision logs).
    #[must_use]
    pub fn debouncer(&self) -> &ResizeDebouncer {
        &self.debouncer
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to queue events in tests.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn drain(&mut self) -> (StepResult, Option<NavError>) {
        let mut events_processed = 0;
        let mut transitions = 0;
        let mut first_err = None;

        while let Some(event) = self.host.poll_event() {
            events_processed += 1;
            if !self.mounted {
                tracing::trace!(
                    target: "navkit.menu",
                    event = event.name(),
                    "event discarded while unmounted"
                );
                continue;
            }
            let name = event.name();
            match self.dispatch(event) {
                Ok(changed) => transitions += changed,
                Err(err) => {
                    tracing::warn!(
                        target: "navkit.menu",
                        event = name,
                        error = %err,
                        "event failed; continuing"
                    );
                    first_err.get_or_insert(err);
                }
            }
        }

        if self.mounted && self.debouncer.pending().is_some_and(|p| p.timer.is_none()) {
            // No host timer backs the pending entry; poll it instead.
            if let Some(fire) = self.debouncer.tick_at(self.host.now()) {
                match self.measure(fire.width) {
                    Ok(changed) => transitions += changed,
                    Err(err) => {
                        first_err.get_or_insert(err);
                    }
                }
            }
        }

        let result = StepResult {
            mounted: self.mounted,
            events_processed,
            transitions,
        };
        (result, first_err)
    }

    fn ensure_mounted(&self) -> Result<(), NavError> {
        if self.mounted {
            Ok(())
        } else {
            Err(NavError::NotMounted)
        }
    }

    fn dispatch(&mut self, event: NavEvent) -> Result<u32, NavError> {
        match event {
            NavEvent::Resize { width } => {
                let scheduled = self.debouncer.record_at(width, self.host.now());
                if let Some(old) = scheduled.supersedes {
                    self.host.clear_timer(old);
                }
                match self.host.set_timer(scheduled.delay) {
                    Ok(timer) => self.debouncer.arm(timer),
                    Err(err) => tracing::warn!(
                        target: "navkit.debounce",
                        error = %err,
                        "timer unavailable; falling back to polling"
                    ),
                }
                Ok(0)
            }
            NavEvent::TimerElapsed(timer) => match self.debouncer.fire(timer, self.host.now()) {
                Some(fire) => self.measure(fire.width),
                None => Ok(0),
            },
            NavEvent::PageLoad { path } => {
                let mut changed = self.counted(ControlInput::PageLoaded { path })?;
                let width = self.host.viewport_width();
                changed += self.measure(width)?;
                Ok(changed)
            }
            NavEvent::Toggle => self.counted(ControlInput::Toggle),
            NavEvent::LinkActivate { href } => self.counted(ControlInput::LinkActivated { href }),
            NavEvent::ControlledOpen(open) => self.counted(ControlInput::Controlled(open)),
        }
    }

    fn measure(&mut self, width: u32) -> Result<u32, NavError> {
        self.counted(ControlInput::Measure { width })
    }

    fn counted(&mut self, input: ControlInput) -> Result<u32, NavError> {
        Ok(u32::from(self.apply(input)?.changed()))
    }

    fn apply(&mut self, input: ControlInput) -> Result<Transition, NavError> {
        let transition = self.controller.apply(input);
        for effect in &transition.effects {
            match effect {
                Effect::ScrollLock(locked) => {
                    self.scroll.set(&mut self.host, *locked);
                }
                Effect::PreventDefault => {}
                Effect::Notify(notice) => {
                    if let Some(notify) = self.notifier.as_mut() {
                        notify(notice);
                    }
                }
                Effect::Navigate { path, history } => {
                    tracing::debug!(
                        target: "navkit.route",
                        path = %path,
                        history = history.as_str(),
                        "navigation requested"
                    );
                    if let Err(err) = self.host.navigate(path, *history) {
                        tracing::warn!(
                            target: "navkit.route",
                            path = %path,
                            error = %err,
                            "router rejected navigation"
                        );
                        return Err(err);
                    }
                }
            }
        }
        Ok(transition)
    }
}

impl<H: NavHost> Drop for NavRuntime<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}
