#![forbid(unsafe_code)]

//! Active-route tracking and link appearance.
//!
//! The route recorded when a link is activated is only *pending*. It becomes
//! the active route when the router's page-load signal reports it, which
//! also covers navigations the menu never saw (browser back/forward). The
//! active-route query reads the committed value only, so it never observes a
//! half-finished navigation.

use serde::{Deserialize, Serialize};

/// Trailing-slash policy for route comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingSlash {
    /// `/about/` and `/about` name the same route; the slash is stripped.
    #[default]
    Never,
    /// Paths are compared verbatim.
    Preserve,
}

impl TrailingSlash {
    /// Normalize `path` under this policy.
    ///
    /// The root path `/` is never stripped and an empty path becomes `/`.
    #[must_use]
    pub fn normalize(self, path: &str) -> String {
        if path.is_empty() {
            return "/".to_owned();
        }
        match self {
            Self::Preserve => path.to_owned(),
            Self::Never => {
                let trimmed = path.trim_end_matches('/');
                if trimmed.is_empty() {
                    "/".to_owned()
                } else {
                    trimmed.to_owned()
                }
            }
        }
    }
}

/// Currently displayed route plus an optional in-flight navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoute {
    policy: TrailingSlash,
    committed: String,
    pending: Option<String>,
}

impl Default for ActiveRoute {
    fn default() -> Self {
        Self::new(TrailingSlash::default())
    }
}

impl ActiveRoute {
    /// Create a route tracker with an empty committed path.
    #[must_use]
    pub fn new(policy: TrailingSlash) -> Self {
        Self {
            policy,
            committed: String::new(),
            pending: None,
        }
    }

    /// The committed path (empty before the first page-load reading).
    #[must_use]
    pub fn current(&self) -> &str {
        &self.committed
    }

    /// The pending navigation target, if a link was activated and the
    /// matching page-load has not arrived yet.
    #[must_use]
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Record a navigation target that has been requested but not completed.
    pub fn set_pending(&mut self, path: &str) {
        self.pending = Some(self.policy.normalize(path));
    }

    /// Commit the path reported by a page-load signal.
    ///
    /// Returns `true` if the committed path changed. Any pending target is
    /// cleared: the router has settled, whatever it settled on.
    pub fn commit(&mut self, path: &str) -> bool {
        let path = self.policy.normalize(path);
        self.pending = None;
        if self.committed == path {
            return false;
        }
        self.committed = path;
        true
    }

    /// Whether `path` is the committed route.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        !self.committed.is_empty() && self.committed == self.policy.normalize(path)
    }
}

/// A navigation link shown in the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    /// Visible label.
    pub label: String,
    /// Target path.
    pub href: String,
}

impl NavLink {
    /// Create a link.
    #[must_use]
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Display classification of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkAppearance {
    /// The link points at the displayed page (highlighted).
    Active,
    /// Any other link.
    Inactive,
}

impl LinkAppearance {
    /// Classify `link` against the tracked route.
    #[must_use]
    pub fn of(link: &NavLink, route: &ActiveRoute) -> Self {
        if route.is_active(&link.href) {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_policy_strips_trailing_slash() {
        let p = TrailingSlash::Never;
        assert_eq!(p.normalize("/about/"), "/about");
        assert_eq!(p.normalize("/about"), "/about");
        assert_eq!(p.normalize("/"), "/");
        assert_eq!(p.normalize("//"), "/");
        assert_eq!(p.normalize(""), "/");
    }

    #[test]
    fn preserve_policy_keeps_path() {
        assert_eq!(TrailingSlash::Preserve.normalize("/about/"), "/about/");
    }

    #[test]
    fn nothing_active_before_first_commit() {
        let route = ActiveRoute::default();
        assert!(!route.is_active("/"));
        assert_eq!(route.current(), "");
    }

    #[test]
    fn pending_does_not_affect_active_query() {
        let mut route = ActiveRoute::default();
        route.commit("/");
        route.set_pending("/about");
        assert!(route.is_active("/"));
        assert!(!route.is_active("/about"));
        assert_eq!(route.pending(), Some("/about"));
    }

    #[test]
    fn commit_clears_pending_and_reports_change() {
        let mut route = ActiveRoute::default();
        assert!(route.commit("/"));
        route.set_pending("/about");
        assert!(route.commit("/about/"));
        assert_eq!(route.pending(), None);
        assert!(route.is_active("/about"));
        assert!(!route.is_active("/"));
        assert!(!route.commit("/about"));
    }

    #[test]
    fn link_appearance_follows_route() {
        let mut route = ActiveRoute::default();
        route.commit("/robotics");
        let robotics = NavLink::new("Robótica", "/robotics");
        let home = NavLink::new("Inicio", "/");
        assert_eq!(LinkAppearance::of(&robotics, &route), LinkAppearance::Active);
        assert_eq!(LinkAppearance::of(&home, &route), LinkAppearance::Inactive);
    }
}
