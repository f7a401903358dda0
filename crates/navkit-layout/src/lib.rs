#![forbid(unsafe_code)]

//! Viewport classification and menu layout.
//!
//! This crate answers the two pure questions the menu controller needs:
//!
//! - [`ViewportPolicy::classify`] / [`classify`] - which layout mode a width
//!   belongs to ([`ViewportClass::Compact`] or [`ViewportClass::Wide`]).
//! - [`MenuLayout::resolve`] - how the menu should be presented given the
//!   (possibly still unknown) class and the open/closed state.
//!
//! Both are free of side effects; all stateful behavior lives in
//! `navkit-runtime`.
//!
//! | Width (px)      | Class     | Closed    | Open            |
//! |-----------------|-----------|-----------|-----------------|
//! | not yet measured| -         | inline row| inline row      |
//! | `<= 1024`       | `Compact` | hidden    | overlay column  |
//! | `> 1024`        | `Wide`    | inline row| inline row      |

use serde::{Deserialize, Serialize};

/// Default breakpoint in logical pixels. Widths strictly above it are wide.
pub const DEFAULT_BREAKPOINT_PX: u32 = 1024;

/// Layout mode derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    /// Narrow viewport: the menu is a collapsible overlay.
    Compact,
    /// Wide viewport: the menu is an always-visible inline bar.
    Wide,
}

impl ViewportClass {
    /// Short label for display and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Wide => "wide",
        }
    }
}

impl std::fmt::Display for ViewportClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Breakpoint threshold for viewport classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportPolicy {
    /// Widths strictly greater than this are [`ViewportClass::Wide`].
    pub breakpoint_px: u32,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ViewportPolicy {
    /// The site's breakpoint: 1024 px.
    pub const DEFAULT: Self = Self {
        breakpoint_px: DEFAULT_BREAKPOINT_PX,
    };

    /// Create a policy with an explicit breakpoint.
    #[must_use]
    pub const fn new(breakpoint_px: u32) -> Self {
        Self { breakpoint_px }
    }

    /// Classify a width.
    #[inline]
    #[must_use]
    pub const fn classify(self, width_px: u32) -> ViewportClass {
        if width_px > self.breakpoint_px {
            ViewportClass::Wide
        } else {
            ViewportClass::Compact
        }
    }
}

/// Classify a width against the default 1024 px breakpoint.
#[inline]
#[must_use]
pub const fn classify(width_px: u32) -> ViewportClass {
    ViewportPolicy::DEFAULT.classify(width_px)
}

/// Menu open/closed state.
///
/// Only visually meaningful in [`ViewportClass::Compact`]; in wide mode it is
/// still tracked but does not affect presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuState {
    /// Overlay hidden.
    #[default]
    Closed,
    /// Overlay shown.
    Open,
}

impl MenuState {
    /// Map a boolean "is open" flag to a state.
    #[must_use]
    pub const fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    /// Whether the state is [`MenuState::Open`].
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// The opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    /// Short label for display and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
        }
    }
}

/// How the menu is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuLayout {
    /// Horizontal inline bar (wide viewports, or before the first measurement).
    InlineRow,
    /// Full-height vertical overlay (compact and open).
    OverlayColumn,
    /// Not rendered (compact and closed).
    Hidden,
}

impl MenuLayout {
    /// Resolve the presentation for a class and state.
    ///
    /// An unknown class resolves to [`MenuLayout::InlineRow`] so the overlay
    /// never flashes before the first width reading.
    #[must_use]
    pub const fn resolve(class: Option<ViewportClass>, state: MenuState) -> Self {
        match (class, state) {
            (Some(ViewportClass::Compact), MenuState::Open) => Self::OverlayColumn,
            (Some(ViewportClass::Compact), MenuState::Closed) => Self::Hidden,
            (Some(ViewportClass::Wide), _) | (None, _) => Self::InlineRow,
        }
    }

    /// Stable name, matching the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InlineRow => "inline_row",
            Self::OverlayColumn => "overlay_column",
            Self::Hidden => "hidden",
        }
    }

    /// Whether the overlay (as opposed to the inline bar) is showing.
    #[must_use]
    pub const fn is_overlay(self) -> bool {
        matches!(self, Self::OverlayColumn)
    }

    /// Whether any menu content is visible.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}
