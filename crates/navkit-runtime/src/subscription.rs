#![forbid(unsafe_code)]

//! Scoped listener registration.
//!
//! The registry remembers the exact [`ListenerId`] the host handed back for
//! every registration and removes listeners by that id. Cleanup therefore
//! always matches the original registration, no matter how often the region
//! is remounted.
//!
//! # How it works
//!
//! 1. The runtime declares the set of [`ListenerKinds`] it wants.
//! 2. [`ListenerRegistry::reconcile`] removes registrations no longer wanted
//!    and adds missing ones.
//! 3. [`ListenerRegistry::clear`] removes everything (unmount).

use navkit_core::NavError;
use navkit_core::event::{ListenerId, ListenerKind, ListenerKinds};

use crate::host::NavHost;

/// One live registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// What is being listened to.
    pub kind: ListenerKind,
    /// Host handle for removal.
    pub id: ListenerId,
}

/// Tracks the listeners a mounted runtime holds on its host.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    active: Vec<Registration>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the registered set in line with `desired`.
    ///
    /// Kinds already registered are left alone, so reconciling twice never
    /// doubles a listener. On error, registrations made so far are kept and
    /// remain removable through [`clear`](Self::clear).
    pub fn reconcile<H: NavHost + ?Sized>(
        &mut self,
        host: &mut H,
        desired: ListenerKinds,
    ) -> Result<(), NavError> {
        let before = self.active.len();
        tracing::trace!(
            target: "navkit.listeners",
            desired = ?desired,
            active_before = before,
            "listener reconcile starting"
        );

        let mut kept = Vec::with_capacity(self.active.len());
        for reg in self.active.drain(..) {
            if desired.contains(reg.kind.flag()) {
                kept.push(reg);
            } else {
                tracing::debug!(
                    target: "navkit.listeners",
                    kind = reg.kind.event_type(),
                    id = reg.id.0,
                    "removing listener"
                );
                host.remove_listener(reg.id);
            }
        }
        self.active = kept;

        for kind in desired.kinds() {
            if self.is_registered(kind) {
                continue;
            }
            let id = host.add_listener(kind)?;
            tracing::debug!(
                target: "navkit.listeners",
                kind = kind.event_type(),
                id = id.0,
                "added listener"
            );
            self.active.push(Registration { kind, id });
        }

        tracing::trace!(
            target: "navkit.listeners",
            active_before = before,
            active_after = self.active.len(),
            "listener reconcile complete"
        );
        Ok(())
    }

    /// Remove every registration.
    pub fn clear<H: NavHost + ?Sized>(&mut self, host: &mut H) {
        for reg in self.active.drain(..) {
            host.remove_listener(reg.id);
        }
    }

    /// Whether `kind` is registered.
    #[must_use]
    pub fn is_registered(&self, kind: ListenerKind) -> bool {
        self.active.iter().any(|r| r.kind == kind)
    }

    /// Number of live registrations.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Live registrations in registration order.
    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.active
    }
}
