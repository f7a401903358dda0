#![forbid(unsafe_code)]

//! Canonical navigation events.
//!
//! Every signal the menu controller reacts to is expressed as a [`NavEvent`].
//! Hosts (the DOM binding, the headless test host) translate their native
//! callbacks into these values and queue them; the runtime drains the queue
//! strictly in arrival order.
//!
//! # Design Notes
//!
//! - Widths are logical CSS pixels. A width is always non-negative.
//! - `PageLoad` covers both the initial document load and every completed
//!   client-side navigation (including browser back/forward).
//! - Timer and listener identifiers are opaque host-assigned handles.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Opaque handle for a host timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Opaque handle for a registered host listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Canonical navigation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum NavEvent {
    /// Raw viewport resize signal carrying the width read at signal time.
    Resize {
        /// Viewport width in logical pixels.
        width: u32,
    },

    /// A page finished loading (initial load or client-side navigation).
    PageLoad {
        /// Path of the page that is now displayed.
        path: String,
    },

    /// A host timer elapsed.
    TimerElapsed(TimerId),

    /// The shell's toggle button was pressed.
    Toggle,

    /// A menu link was activated.
    LinkActivate {
        /// The link's target path.
        href: String,
    },

    /// The controlled-open signal was asserted (`Some`) or withdrawn (`None`).
    ControlledOpen(Option<bool>),
}

impl NavEvent {
    /// Short stable name, used as a structured log field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::PageLoad { .. } => "page_load",
            Self::TimerElapsed(_) => "timer_elapsed",
            Self::Toggle => "toggle",
            Self::LinkActivate { .. } => "link_activate",
            Self::ControlledOpen(_) => "controlled_open",
        }
    }
}

/// Environment signals a controller subscribes to while mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenerKind {
    /// Window `resize`.
    Resize,
    /// Client router page-load signal (`astro:page-load`).
    PageLoad,
    /// Initial document load (`DOMContentLoaded`); handled like `PageLoad`.
    DomReady,
}

impl ListenerKind {
    /// All listener kinds in registration order.
    pub const ALL: [ListenerKind; 3] = [Self::Resize, Self::PageLoad, Self::DomReady];

    /// DOM event type name.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::PageLoad => "astro:page-load",
            Self::DomReady => "DOMContentLoaded",
        }
    }

    /// Flag corresponding to this kind.
    #[must_use]
    pub const fn flag(self) -> ListenerKinds {
        match self {
            Self::Resize => ListenerKinds::RESIZE,
            Self::PageLoad => ListenerKinds::PAGE_LOAD,
            Self::DomReady => ListenerKinds::DOM_READY,
        }
    }
}

bitflags! {
    /// A set of [`ListenerKind`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ListenerKinds: u8 {
        const RESIZE    = 0b001;
        const PAGE_LOAD = 0b010;
        const DOM_READY = 0b100;
    }
}

impl ListenerKinds {
    /// Iterate the kinds contained in this set, in registration order.
    pub fn kinds(self) -> impl Iterator<Item = ListenerKind> {
        ListenerKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(kind.flag()))
    }
}

/// How the router should record a navigation in session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Push a new history entry.
    #[default]
    Push,
    /// Replace the current history entry.
    Replace,
}

impl HistoryMode {
    /// Value passed to the router's `history` option.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Replace => "replace",
        }
    }
}
