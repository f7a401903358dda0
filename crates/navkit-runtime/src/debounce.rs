//! Trailing-edge resize debouncer.
//!
//! Raw resize signals arrive in bursts while the user drags a window edge.
//! The debouncer collapses each burst into a single re-classification that
//! runs no sooner than `delay` after the **last** signal of the burst.
//!
//! # Usage
//!
//! ```ignore
//! use navkit_runtime::debounce::{DebounceConfig, ResizeDebouncer};
//!
//! let mut debouncer = ResizeDebouncer::new(DebounceConfig::default());
//!
//! // On every raw resize signal:
//! let scheduled = debouncer.record_at(width, now);
//! if let Some(old) = scheduled.supersedes {
//!     host.clear_timer(old);
//! }
//! let id = host.set_timer(scheduled.delay)?;
//! debouncer.arm(id);
//!
//! // When the host timer elapses:
//! if let Some(fire) = debouncer.fire(id, now) {
//!     classify(fire.width);
//! }
//! ```
//!
//! # Invariants
//!
//! - **Single pending**: at most one timer is armed. Recording a new signal
//!   always hands back the previous timer for cancellation before a new one
//!   is armed.
//! - **Latest wins**: the width applied is the width of the last signal.
//! - **No late fires**: after [`ResizeDebouncer::cancel`] a stale timer id is
//!   rejected by [`ResizeDebouncer::fire`].
//! - **Deterministic**: identical signal schedules yield identical decisions.
//!
//! # Failure Modes
//!
//! | Condition                     | Behavior                  |
//! |-------------------------------|---------------------------|
//! | Timer fires for a stale id    | Ignored, logged as stale  |
//! | `delay = 0`                   | Fires on the next timer   |
//! | Fire with nothing pending     | Returns `None`            |

#![forbid(unsafe_code)]

use std::time::Duration;

use navkit_core::event::TimerId;
use serde::Serialize;

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(60);

/// Configuration for the resize debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    /// Quiet period after the last signal before classification runs.
    pub delay: Duration,
    /// Record a decision log entry for every signal, fire, and cancel.
    pub enable_logging: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DEBOUNCE,
            enable_logging: false,
        }
    }
}

impl DebounceConfig {
    /// Set the debounce window.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Enable or disable decision logging.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

/// The single pending re-classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingResize {
    /// Width of the latest signal in the burst.
    pub width: u32,
    /// Host timer backing this pending entry, once armed.
    pub timer: Option<TimerId>,
    /// Time of the first signal in the burst.
    pub burst_start: Duration,
    /// Time of the latest signal in the burst.
    pub last_signal: Duration,
    /// Signals collapsed into this entry so far.
    pub signals: u32,
}

impl PendingResize {
    /// When the classification becomes due.
    #[must_use]
    pub fn due_at(&self, delay: Duration) -> Duration {
        self.last_signal.saturating_add(delay)
    }
}

/// Returned by [`ResizeDebouncer::record_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// Previously armed timer that must be cleared before arming a new one.
    pub supersedes: Option<TimerId>,
    /// Delay to arm the new timer with.
    pub delay: Duration,
}

/// A debounced classification that is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceFire {
    /// Width to classify.
    pub width: u32,
    /// Number of raw signals the burst collapsed.
    pub signals: u32,
    /// Time from the first signal of the burst to the fire.
    pub burst_duration: Duration,
}

/// Kind of debouncer decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceDecision {
    /// First signal of a burst scheduled.
    Schedule,
    /// Signal replaced an already-pending entry.
    Supersede,
    /// Pending entry fired.
    Fire,
    /// Timer fired for an id that is no longer armed.
    Stale,
    /// Pending entry cancelled (teardown).
    Cancel,
}

/// Decision log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebounceLog {
    /// Monotonic decision index.
    pub idx: u64,
    /// Host time of the decision, in milliseconds.
    pub at_ms: u64,
    /// What happened.
    pub decision: DebounceDecision,
    /// Width involved, when known.
    pub width: Option<u32>,
    /// Timer involved, when known.
    pub timer: Option<u64>,
}

/// Aggregate counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Raw signals recorded.
    pub signals: u64,
    /// Classifications fired.
    pub fires: u64,
    /// Pending entries superseded by a newer signal.
    pub superseded: u64,
    /// Stale timer fires rejected.
    pub stale: u64,
    /// Pending entries cancelled.
    pub cancelled: u64,
}

/// Trailing-edge resize debouncer.
#[derive(Debug)]
pub struct ResizeDebouncer {
    config: DebounceConfig,
    pending: Option<PendingResize>,
    stats: DebounceStats,
    logs: Vec<DebounceLog>,
    decision_idx: u64,
}

impl ResizeDebouncer {
    /// Create a debouncer.
    #[must_use]
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            pending: None,
            stats: DebounceStats::default(),
            logs: Vec::new(),
            decision_idx: 0,
        }
    }

    /// The configured debounce window.
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.config.delay
    }

    /// Record a raw resize signal at `now`.
    ///
    /// The returned [`Scheduled`] carries the timer to clear (if any) and
    /// the delay for the replacement timer. Call [`arm`](Self::arm) with the
    /// new timer id.
    pub fn record_at(&mut self, width: u32, now: Duration) -> Scheduled {
        self.stats.signals += 1;

        let (supersedes, decision) = match self.pending.as_mut() {
            Some(pending) => {
                let old = pending.timer.take();
                pending.width = width;
                pending.last_signal = now;
                pending.signals += 1;
                self.stats.superseded += 1;
                (old, DebounceDecision::Supersede)
            }
            None => {
                self.pending = Some(PendingResize {
                    width,
                    timer: None,
                    burst_start: now,
                    last_signal: now,
                    signals: 1,
                });
                (None, DebounceDecision::Schedule)
            }
        };

        tracing::trace!(
            target: "navkit.debounce",
            width,
            superseded = ?supersedes,
            "resize signal recorded"
        );
        self.log(now, decision, Some(width), supersedes);

        Scheduled {
            supersedes,
            delay: self.config.delay,
        }
    }

    /// Attach the host timer backing the pending entry.
    ///
    /// Ignored when nothing is pending.
    pub fn arm(&mut self, timer: TimerId) {
        if let Some(pending) = self.pending.as_mut() {
            pending.timer = Some(timer);
        }
    }

    /// Handle an elapsed host timer.
    ///
    /// Returns the classification to run when `timer` is the armed timer;
    /// any other id is stale and yields `None`.
    pub fn fire(&mut self, timer: TimerId, now: Duration) -> Option<DebounceFire> {
        let armed = self.pending.and_then(|p| p.timer);
        if armed != Some(timer) {
            self.stats.stale += 1;
            tracing::trace!(target: "navkit.debounce", timer = timer.0, "stale timer ignored");
            self.log(now, DebounceDecision::Stale, None, Some(timer));
            return None;
        }
        self.take_fire(now)
    }

    /// Poll for a due classification without a host timer.
    ///
    /// Fires when `now` is at least `delay` past the last signal.
    pub fn tick_at(&mut self, now: Duration) -> Option<DebounceFire> {
        let pending = self.pending?;
        if now < pending.due_at(self.config.delay) {
            return None;
        }
        self.take_fire(now)
    }

    /// Time until the pending classification is due.
    #[must_use]
    pub fn time_until_fire(&self, now: Duration) -> Option<Duration> {
        let pending = self.pending?;
        Some(pending.due_at(self.config.delay).saturating_sub(now))
    }

    /// Drop the pending entry, returning its timer so the host can clear it.
    pub fn cancel(&mut self, now: Duration) -> Option<TimerId> {
        let pending = self.pending.take()?;
        self.stats.cancelled += 1;
        self.log(now, DebounceDecision::Cancel, Some(pending.width), pending.timer);
        tracing::debug!(
            target: "navkit.debounce",
            width = pending.width,
            "pending resize cancelled"
        );
        pending.timer
    }

    /// Whether a classification is pending.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending entry, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingResize> {
        self.pending.as_ref()
    }

    /// Aggregate counters.
    #[must_use]
    pub fn stats(&self) -> DebounceStats {
        self.stats
    }

    /// Decision logs (empty unless logging is enabled).
    #[must_use]
    pub fn logs(&self) -> &[DebounceLog] {
        &self.logs
    }

    /// Decision logs as JSON lines.
    #[must_use]
    pub fn logs_jsonl(&self) -> String {
        let mut out = String::new();
        for entry in &self.logs {
            if let Ok(line) = serde_json::to_string(entry) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    fn take_fire(&mut self, now: Duration) -> Option<DebounceFire> {
        let pending = self.pending.take()?;
        self.stats.fires += 1;
        let fire = DebounceFire {
            width: pending.width,
            signals: pending.signals,
            burst_duration: now.saturating_sub(pending.burst_start),
        };
        self.log(now, DebounceDecision::Fire, Some(fire.width), pending.timer);
        tracing::debug!(
            target: "navkit.debounce",
            width = fire.width,
            signals = fire.signals,
            burst_ms = fire.burst_duration.as_millis() as u64,
            "debounced resize fired"
        );
        Some(fire)
    }

    fn log(
        &mut self,
        now: Duration,
        decision: DebounceDecision,
        width: Option<u32>,
        timer: Option<TimerId>,
    ) {
        self.decision_idx += 1;
        if !self.config.enable_logging {
            return;
        }
        self.logs.push(DebounceLog {
            idx: self.decision_idx,
            at_ms: now.as_millis() as u64,
            decision,
            width,
            timer: timer.map(|t| t.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn logged() -> ResizeDebouncer {
        ResizeDebouncer::new(DebounceConfig::default().with_logging(true))
    }

    #[test]
    fn new_debouncer_is_idle() {
        let d = ResizeDebouncer::new(DebounceConfig::default());
        assert!(!d.has_pending());
        assert_eq!(d.delay(), ms(60));
        assert_eq!(d.time_until_fire(ms(0)), None);
    }

    #[test]
    fn first_signal_schedules_without_supersede() {
        let mut d = logged();
        let s = d.record_at(800, ms(0));
        assert_eq!(s.supersedes, None);
        assert_eq!(s.delay, ms(60));
        assert!(d.has_pending());
    }

    #[test]
    fn second_signal_supersedes_armed_timer() {
        let mut d = logged();
        d.record_at(800, ms(0));
        d.arm(TimerId(1));
        let s = d.record_at(900, ms(10));
        assert_eq!(s.supersedes, Some(TimerId(1)));
        d.arm(TimerId(2));
        assert_eq!(d.pending().map(|p| p.timer), Some(Some(TimerId(2))));
        assert_eq!(d.stats().superseded, 1);
    }

    #[test]
    fn stale_timer_is_rejected() {
        let mut d = logged();
        d.record_at(800, ms(0));
        d.arm(TimerId(1));
        d.record_at(900, ms(10));
        d.arm(TimerId(2));
        assert_eq!(d.fire(TimerId(1), ms(60)), None);
        assert_eq!(d.stats().stale, 1);

        let fire = d.fire(TimerId(2), ms(70)).expect("armed timer fires");
        assert_eq!(fire.width, 900);
        assert_eq!(fire.signals, 2);
        assert_eq!(fire.burst_duration, ms(70));
        assert!(!d.has_pending());
    }

    #[test]
    fn latest_width_wins_over_burst() {
        let mut d = logged();
        for (i, w) in [700u32, 900, 1100, 1300, 1050].iter().enumerate() {
            d.record_at(*w, ms(i as u64 * 10));
            d.arm(TimerId(i as u64));
        }
        let fire = d.fire(TimerId(4), ms(100)).expect("fires");
        assert_eq!(fire.width, 1050);
        assert_eq!(fire.signals, 5);
        assert_eq!(d.stats().fires, 1);
    }

    #[test]
    fn tick_respects_trailing_delay() {
        let mut d = logged();
        d.record_at(800, ms(0));
        d.record_at(850, ms(50));
        assert_eq!(d.tick_at(ms(100)), None);
        assert_eq!(d.time_until_fire(ms(100)), Some(ms(10)));
        let fire = d.tick_at(ms(110)).expect("due");
        assert_eq!(fire.width, 850);
        assert_eq!(d.tick_at(ms(500)), None);
    }

    #[test]
    fn cancel_returns_timer_and_blocks_late_fire() {
        let mut d = logged();
        d.record_at(800, ms(0));
        d.arm(TimerId(7));
        assert_eq!(d.cancel(ms(5)), Some(TimerId(7)));
        assert_eq!(d.fire(TimerId(7), ms(60)), None);
        assert_eq!(d.cancel(ms(70)), None);
        assert_eq!(d.stats().cancelled, 1);
    }

    #[test]
    fn arm_without_pending_is_ignored() {
        let mut d = logged();
        d.arm(TimerId(3));
        assert!(!d.has_pending());
    }

    #[test]
    fn logs_jsonl_is_one_object_per_line() {
        let mut d = logged();
        d.record_at(800, ms(0));
        d.arm(TimerId(1));
        d.fire(TimerId(1), ms(60));
        let jsonl = d.logs_jsonl();
        let lines: Vec<_> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(first["decision"], "schedule");
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("valid json");
        assert_eq!(second["decision"], "fire");
        assert_eq!(second["width"], 800);
        assert_eq!(second["at_ms"], 60);
    }

    #[test]
    fn logging_disabled_keeps_no_entries() {
        let mut d = ResizeDebouncer::new(DebounceConfig::default());
        d.record_at(800, ms(0));
        d.tick_at(ms(60));
        assert!(d.logs().is_empty());
        assert_eq!(d.stats().fires, 1);
    }

    mod property {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any burst whose gaps are all shorter than the window collapses
            /// into exactly one classification using the last width.
            #[test]
            fn burst_collapses_to_one_fire(
                widths in prop::collection::vec(0u32..4000, 1..40),
                gaps in prop::collection::vec(0u64..60, 40),
            ) {
                let mut d = ResizeDebouncer::new(DebounceConfig::default());
                let mut now = Duration::ZERO;
                let mut fires = 0;
                for (i, w) in widths.iter().enumerate() {
                    now += Duration::from_millis(gaps[i]);
                    if d.tick_at(now).is_some() {
                        fires += 1;
                    }
                    d.record_at(*w, now);
                }
                prop_assert_eq!(fires, 0);
                let fire = d.tick_at(now + DEFAULT_DEBOUNCE);
                prop_assert_eq!(fire.map(|f| f.width), widths.last().copied());
                prop_assert_eq!(d.stats().fires, 1);
                prop_assert!(!d.has_pending());
            }

            /// Timer-driven and polling paths agree.
            #[test]
            fn timer_and_tick_paths_agree(
                widths in prop::collection::vec(0u32..4000, 1..20),
            ) {
                let mut polled = ResizeDebouncer::new(DebounceConfig::default());
                let mut timed = ResizeDebouncer::new(DebounceConfig::default());
                for (i, w) in widths.iter().enumerate() {
                    let now = Duration::from_millis(i as u64 * 5);
                    polled.record_at(*w, now);
                    timed.record_at(*w, now);
                    timed.arm(TimerId(i as u64));
                }
                let end = Duration::from_millis(widths.len() as u64 * 5 + 60);
                let a = polled.tick_at(end).map(|f| f.width);
                let b = timed.fire(TimerId(widths.len() as u64 - 1), end).map(|f| f.width);
                prop_assert_eq!(a, b);
            }
        }
    }
}
