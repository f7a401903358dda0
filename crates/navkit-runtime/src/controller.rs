//! Menu state machine.
//!
//! [`MenuController`] is a pure transition table: it takes one
//! [`ControlInput`] at a time, updates its state, and returns the side
//! effects the caller must perform, in order. It never touches the document
//! itself; [`crate::NavRuntime`] executes the effects against a host.
//!
//! # Transition table
//!
//! | From   | Input                                 | To       |
//! |--------|---------------------------------------|----------|
//! | Closed | `Toggle`                              | Open     |
//! | Open   | `Toggle`                              | Closed   |
//! | any    | `Measure` that changes the class      | Closed   |
//! | any    | `Measure` within the same class       | (same)   |
//! | Open   | `LinkActivated` while compact         | Closed   |
//! | any    | `LinkActivated` while wide or unknown | (same)   |
//! | any    | `Controlled(Some(v))`                 | v        |
//! | any    | `Controlled(None)`                    | (same)   |
//! | any    | `PageLoaded`                          | (same)   |
//! | any    | `Teardown`                            | Closed   |
//!
//! While a controlled value is present, `Toggle` is ignored: the external
//! owner is authoritative until it withdraws the signal.
//!
//! # Invariants
//!
//! 1. After every input, scroll lock is asserted iff the class is
//!    `Compact` and the state is `Open`.
//! 2. Every class change resets the state to `Closed`.
//! 3. A link activation in compact mode always closes the overlay before
//!    navigation is requested.
//! 4. The active-route query only ever reads a committed route.

#![forbid(unsafe_code)]

use navkit_core::event::HistoryMode;
use navkit_core::route::{ActiveRoute, TrailingSlash};
use navkit_layout::{MenuLayout, MenuState, ViewportClass, ViewportPolicy};
use serde::Serialize;
use smallvec::SmallVec;

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlInput {
    /// A (debounced or initial) width reading.
    Measure {
        /// Viewport width in logical pixels.
        width: u32,
    },
    /// The shell's toggle button.
    Toggle,
    /// A menu link was activated.
    LinkActivated {
        /// Link target.
        href: String,
    },
    /// Controlled-open signal asserted (`Some`) or withdrawn (`None`).
    Controlled(Option<bool>),
    /// The router reported a completed navigation.
    PageLoaded {
        /// Path now displayed.
        path: String,
    },
    /// The navigation region is being torn down.
    Teardown,
}

impl ControlInput {
    /// Short stable name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Measure { .. } => "measure",
            Self::Toggle => "toggle",
            Self::LinkActivated { .. } => "link_activated",
            Self::Controlled(_) => "controlled",
            Self::PageLoaded { .. } => "page_loaded",
            Self::Teardown => "teardown",
        }
    }
}

/// State reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuNotice {
    /// Whether the menu state is open.
    pub open: bool,
    /// Current class (`None` before the first measurement).
    pub class: Option<ViewportClass>,
    /// Resolved presentation.
    pub layout: MenuLayout,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drive the document scroll lock to the given value.
    ScrollLock(bool),
    /// Suppress the link's default full-page navigation.
    PreventDefault,
    /// Report state to the shell.
    Notify(MenuNotice),
    /// Ask the router to navigate.
    Navigate {
        /// Normalized target path.
        path: String,
        /// History handling.
        history: HistoryMode,
    },
}

/// Result of applying one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State before the input.
    pub from: MenuState,
    /// State after the input.
    pub to: MenuState,
    /// Class before the input.
    pub class_from: Option<ViewportClass>,
    /// Class after the input.
    pub class_to: Option<ViewportClass>,
    /// Effects to execute, in order.
    pub effects: SmallVec<[Effect; 4]>,
}

impl Transition {
    /// Whether the state or class changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from != self.to || self.class_from != self.class_to
    }

    /// Whether the input closed an open menu.
    #[must_use]
    pub fn closed_menu(&self) -> bool {
        self.from.is_open() && !self.to.is_open()
    }

    /// The navigation target, if this transition requested one.
    #[must_use]
    pub fn navigation(&self) -> Option<&str> {
        self.effects.iter().find_map(|e| match e {
            Effect::Navigate { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }
}

/// Decision log entry for a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionRecord {
    /// Monotonic input index.
    pub idx: u64,
    /// Input name.
    pub input: &'static str,
    /// State before.
    pub from: MenuState,
    /// State after.
    pub to: MenuState,
    /// Class before.
    pub class_from: Option<ViewportClass>,
    /// Class after.
    pub class_to: Option<ViewportClass>,
    /// Scroll lock after the transition.
    pub scroll_locked: bool,
    /// Controlled value in force after the transition.
    pub controlled: Option<bool>,
}

/// Configuration for [`MenuController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerConfig {
    /// Breakpoint policy.
    pub policy: ViewportPolicy,
    /// History handling for link navigation.
    pub history: HistoryMode,
    /// Route comparison policy.
    pub trailing_slash: TrailingSlash,
    /// Keep a [`TransitionRecord`] per input.
    pub enable_logging: bool,
}

/// The menu state machine.
#[derive(Debug, Clone)]
pub struct MenuController {
    config: ControllerConfig,
    state: MenuState,
    class: Option<ViewportClass>,
    controlled: Option<bool>,
    scroll_locked: bool,
    route: ActiveRoute,
    input_idx: u64,
    records: Vec<TransitionRecord>,
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl MenuController {
    /// Create a controller: closed, class unknown, no route.
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            route: ActiveRoute::new(config.trailing_slash),
            config,
            state: MenuState::Closed,
            class: None,
            controlled: None,
            scroll_locked: false,
            input_idx: 0,
            records: Vec::new(),
        }
    }

    /// Current menu state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Current viewport class (`None` until the first measurement).
    #[inline]
    #[must_use]
    pub fn class(&self) -> Option<ViewportClass> {
        self.class
    }

    /// Controlled value in force, if any.
    #[must_use]
    pub fn controlled(&self) -> Option<bool> {
        self.controlled
    }

    /// Whether this controller currently asserts the scroll lock.
    #[must_use]
    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Resolved presentation.
    #[must_use]
    pub fn layout(&self) -> MenuLayout {
        MenuLayout::resolve(self.class, self.state)
    }

    /// Route tracker.
    #[must_use]
    pub fn route(&self) -> &ActiveRoute {
        &self.route
    }

    /// Whether `path` is the committed route.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        self.route.is_active(path)
    }

    /// Snapshot reported to the shell.
    #[must_use]
    pub fn notice(&self) -> MenuNotice {
        MenuNotice {
            open: self.state.is_open(),
            class: self.class,
            layout: self.layout(),
        }
    }

    /// Transition records (empty unless logging is enabled).
    #[must_use]
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    /// Transition records as JSON lines.
    #[must_use]
    pub fn records_jsonl(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            if let Ok(line) = serde_json::to_string(record) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Apply one input and return the effects to execute.
    pub fn apply(&mut self, input: ControlInput) -> Transition {
        let from = self.state;
        let class_from = self.class;
        let input_name = input.name();
        let mut effects: SmallVec<[Effect; 4]> = SmallVec::new();
        let mut reassert = false;
        let mut navigate = None;
        let mut notify = true;

        match input {
            ControlInput::Measure { width } => {
                let class = self.config.policy.classify(width);
                if self.class != Some(class) {
                    self.class = Some(class);
                    self.state = MenuState::Closed;
                }
            }
            ControlInput::Toggle => {
                if self.controlled.is_some() {
                    tracing::trace!(
                        target: "navkit.menu",
                        "toggle ignored while controlled"
                    );
                } else {
                    self.state = self.state.toggled();
                }
            }
            ControlInput::LinkActivated { href } => {
                effects.push(Effect::PreventDefault);
                if self.class == Some(ViewportClass::Compact) {
                    self.state = MenuState::Closed;
                }
                self.route.set_pending(&href);
                navigate = self.route.pending().map(str::to_owned);
            }
            ControlInput::Controlled(Some(open)) => {
                self.controlled = Some(open);
                self.state = MenuState::from_open(open);
                reassert = true;
            }
            ControlInput::Controlled(None) => {
                self.controlled = None;
            }
            ControlInput::PageLoaded { path } => {
                if self.route.commit(&path) {
                    tracing::debug!(
                        target: "navkit.route",
                        path = %self.route.current(),
                        "active route committed"
                    );
                }
            }
            ControlInput::Teardown => {
                self.state = MenuState::Closed;
                notify = false;
            }
        }

        let lock = self.class == Some(ViewportClass::Compact) && self.state.is_open();
        if lock != self.scroll_locked || reassert {
            self.scroll_locked = lock;
            effects.push(Effect::ScrollLock(lock));
        }

        if notify && (reassert || self.state != from || self.class != class_from) {
            effects.push(Effect::Notify(self.notice()));
        }

        if let Some(path) = navigate {
            effects.push(Effect::Navigate {
                path,
                history: self.config.history,
            });
        }

        self.input_idx += 1;
        if self.state != from || self.class != class_from {
            tracing::debug!(
                target: "navkit.menu",
                input = input_name,
                from = from.label(),
                to = self.state.label(),
                class = self.class.map(ViewportClass::label).unwrap_or("unknown"),
                scroll_locked = self.scroll_locked,
                "menu transition"
            );
        }
        if self.config.enable_logging {
            self.records.push(TransitionRecord {
                idx: self.input_idx,
                input: input_name,
                from,
                to: self.state,
                class_from,
                class_to: self.class,
                scroll_locked: self.scroll_locked,
                controlled: self.controlled,
            });
        }

        Transition {
            from,
            to: self.state,
            class_from,
            class_to: self.class,
            effects,
        }
    }
}
