#![forbid(unsafe_code)]

//! Document-wide scroll locking.
//!
//! While the compact overlay is visible the page behind it must not scroll.
//! [`ScrollLock`] owns that flag on behalf of the mounted navigation region
//! and writes it to a [`ScrollSurface`] (the document body in a browser).
//!
//! # Invariants
//!
//! - Locking is idempotent: `lock(); lock();` is observably the same as one
//!   `lock()`. There is no nesting counter.
//! - Unlocking an unlocked surface is a no-op. Only
//!   [`ScrollLock::force_release`] writes without a state change.
//! - Only actual state changes reach the surface, so each lock is paired
//!   with exactly one release.

use serde::{Deserialize, Serialize};

/// Body overflow value written by the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Background scrolling suppressed.
    Hidden,
    /// Normal scrolling.
    Auto,
}

impl Overflow {
    /// CSS `overflow` value.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Auto => "auto",
        }
    }
}

/// Something that can suppress background scrolling.
///
/// Implementations must tolerate being called before their underlying
/// element exists (treat it as a no-op).
pub trait ScrollSurface {
    /// Apply the overflow value to the document.
    fn apply_overflow(&mut self, overflow: Overflow);
}

/// Idempotent scroll lock.
#[derive(Debug, Clone, Default)]
pub struct ScrollLock {
    locked: bool,
    locks: u64,
    releases: u64,
}

impl ScrollLock {
    /// Create an unlocked scroll lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked: false,
            locks: 0,
            releases: 0,
        }
    }

    /// Whether the lock is currently asserted.
    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Assert the lock. Returns `true` if the surface was written.
    pub fn lock<S: ScrollSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        self.set(surface, true)
    }

    /// Release the lock. Returns `true` if the surface was written.
    pub fn unlock<S: ScrollSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        self.set(surface, false)
    }

    /// Drive the lock to `locked`. Returns `true` if the surface was written.
    pub fn set<S: ScrollSurface + ?Sized>(&mut self, surface: &mut S, locked: bool) -> bool {
        if self.locked == locked {
            return false;
        }
        self.locked = locked;
        if locked {
            self.locks += 1;
            surface.apply_overflow(Overflow::Hidden);
        } else {
            self.releases += 1;
            surface.apply_overflow(Overflow::Auto);
        }
        crate::debug!(locked, "scroll lock changed");
        true
    }

    /// Write `auto` to the surface whatever the tracked state.
    ///
    /// Used on teardown: afterwards the document is scrollable.
    pub fn force_release<S: ScrollSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.locked {
            self.locked = false;
            self.releases += 1;
        }
        surface.apply_overflow(Overflow::Auto);
        crate::debug!("scroll lock force-released");
    }

    /// Number of lock assertions that reached the surface.
    #[must_use]
    pub const fn lock_count(&self) -> u64 {
        self.locks
    }

    /// Number of releases that reached the surface.
    #[must_use]
    pub const fn release_count(&self) -> u64 {
        self.releases
    }
}
