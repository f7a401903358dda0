//! In-crate fake host for unit tests.

use std::collections::VecDeque;
use std::time::Duration;

use navkit_core::NavError;
use navkit_core::event::{HistoryMode, ListenerId, ListenerKind, NavEvent, TimerId};
use navkit_core::scroll_lock::{Overflow, ScrollSurface};

use crate::host::NavHost;

#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    pub now: Duration,
    pub width: u32,
    pub path: String,
    pub queue: VecDeque<NavEvent>,
    pub listeners: Vec<(ListenerId, ListenerKind)>,
    pub timers: Vec<(TimerId, Duration)>,
    pub cleared_timers: Vec<TimerId>,
    pub overflow: Vec<Overflow>,
    pub navigations: Vec<(String, HistoryMode)>,
    pub fail_listener: Option<ListenerKind>,
    pub fail_navigate: bool,
    pub fail_timer: bool,
    next_id: u64,
}

impl FakeHost {
    pub fn new(width: u32, path: &str) -> Self {
        Self {
            width,
            path: path.to_owned(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, event: NavEvent) {
        self.queue.push_back(event);
    }

    /// Advance time and queue expiry events for timers that came due.
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|(_, at)| *at <= now);
        self.timers = pending;
        for (id, _) in due {
            self.queue.push_back(NavEvent::TimerElapsed(id));
        }
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl ScrollSurface for FakeHost {
    fn apply_overflow(&mut self, overflow: Overflow) {
        self.overflow.push(overflow);
    }
}

impl NavHost for FakeHost {
    fn now(&self) -> Duration {
        self.now
    }

    fn viewport_width(&self) -> u32 {
        self.width
    }

    fn current_path(&self) -> String {
        self.path.clone()
    }

    fn poll_event(&mut self) -> Option<NavEvent> {
        self.queue.pop_front()
    }

    fn add_listener(&mut self, kind: ListenerKind) -> Result<ListenerId, NavError> {
        if self.fail_listener == Some(kind) {
            return Err(NavError::Unsupported(kind.event_type()));
        }
        let id = ListenerId(self.next());
        self.listeners.push((id, kind));
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }

    fn set_timer(&mut self, delay: Duration) -> Result<TimerId, NavError> {
        if self.fail_timer {
            return Err(NavError::Unsupported("setTimeout"));
        }
        let id = TimerId(self.next());
        self.timers.push((id, self.now + delay));
        Ok(id)
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.cleared_timers.push(id);
        self.timers.retain(|(t, _)| *t != id);
    }

    fn navigate(&mut self, path: &str, history: HistoryMode) -> Result<(), NavError> {
        if self.fail_navigate {
            return Err(NavError::Host("router unavailable".into()));
        }
        self.navigations.push((path.to_owned(), history));
        Ok(())
    }
}
