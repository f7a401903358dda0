//! End-to-end menu behavior against the headless document.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use navkit_core::NavError;
use navkit_core::event::{HistoryMode, ListenerKind};
use navkit_core::scroll_lock::Overflow;
use navkit_layout::{MenuLayout, MenuState, ViewportClass};
use navkit_runtime::{MenuNotice, NavConfig, NavRuntime};
use navkit_web::HeadlessHost;
use pretty_assertions::assert_eq;

const DEBOUNCE: Duration = Duration::from_millis(60);

fn mounted(width: u32, path: &str) -> NavRuntime<HeadlessHost> {
    let mut rt = NavRuntime::new(NavConfig::default(), HeadlessHost::new(width, path));
    rt.mount().expect("mount");
    rt
}

fn resize_and_settle(rt: &mut NavRuntime<HeadlessHost>, width: u32) {
    rt.host_mut().resize(width);
    rt.step().expect("step");
    rt.host_mut().advance(DEBOUNCE);
    rt.step().expect("step");
}

fn recording(width: u32, path: &str) -> (NavRuntime<HeadlessHost>, Rc<RefCell<Vec<MenuNotice>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut rt = NavRuntime::new(NavConfig::default(), HeadlessHost::new(width, path))
        .with_notifier(move |n| sink.borrow_mut().push(*n));
    rt.mount().expect("mount");
    (rt, seen)
}

#[test]
fn wide_viewport_never_shows_overlay() {
    let mut rt = mounted(1280, "/");
    assert_eq!(rt.viewport_class(), ViewportClass::Wide);
    for _ in 0..3 {
        rt.toggle().expect("toggle");
        assert_eq!(rt.layout(), MenuLayout::InlineRow);
        assert!(!rt.scroll_locked());
    }
    assert!(rt.host().overflow_writes().is_empty());
}

#[test]
fn compact_toggle_locks_then_unlocks() {
    let mut rt = mounted(800, "/");
    rt.toggle().expect("toggle");
    assert_eq!(rt.menu_state(), MenuState::Open);
    assert_eq!(rt.layout(), MenuLayout::OverlayColumn);
    assert_eq!(rt.host().overflow(), Some(Overflow::Hidden));

    rt.toggle().expect("toggle");
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert_eq!(rt.layout(), MenuLayout::Hidden);
    assert_eq!(rt.host().overflow(), Some(Overflow::Auto));
}

#[test]
fn widening_past_breakpoint_resets_open_menu() {
    let mut rt = mounted(800, "/");
    rt.toggle().expect("toggle");
    resize_and_settle(&mut rt, 1100);
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert_eq!(rt.viewport_class(), ViewportClass::Wide);
    assert!(!rt.scroll_locked());
    assert_eq!(
        rt.host().overflow_writes(),
        [Overflow::Hidden, Overflow::Auto]
    );
}

#[test]
fn compact_link_closes_navigates_and_commits_on_page_load() {
    let mut rt = mounted(800, "/");
    rt.toggle().expect("toggle");

    let outcome = rt.activate_link("/about").expect("link");
    assert!(outcome.default_prevented);
    assert!(outcome.closed_overlay);
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert!(!rt.scroll_locked());
    assert_eq!(
        rt.host().navigations(),
        [("/about".to_owned(), HistoryMode::Push)]
    );
    assert!(rt.is_active("/"));
    assert_eq!(rt.pending_route(), Some("/about"));

    rt.step().expect("step");
    assert!(rt.is_active("/about"));
    assert!(!rt.is_active("/"));
    assert_eq!(rt.pending_route(), None);
    assert_eq!(rt.host().navigations().len(), 1);
}

#[test]
fn unmount_while_open_releases_once_and_silences_timers() {
    let mut rt = mounted(800, "/");
    rt.toggle().expect("toggle");
    rt.host_mut().resize(1200);
    rt.step().expect("step");
    assert_eq!(rt.host().pending_timers(), 1);

    rt.unmount();
    assert_eq!(
        rt.host().overflow_writes(),
        [Overflow::Hidden, Overflow::Auto]
    );
    assert_eq!(rt.host().pending_timers(), 0);
    assert_eq!(rt.host().total_listeners(), 0);

    rt.host_mut().advance(Duration::from_secs(1));
    rt.host_mut().resize(600);
    let step = rt.step().expect("step");
    assert_eq!(step.events_processed, 0);
    assert_eq!(rt.debouncer().stats().fires, 0);
}

#[test]
fn remount_does_not_leak_listeners() {
    let mut rt = mounted(800, "/");
    rt.mount().expect("remount");
    rt.mount().expect("remount");
    for kind in ListenerKind::ALL {
        assert_eq!(rt.host().listener_count(kind), 1, "{kind:?}");
    }
    rt.host_mut().resize(900);
    assert_eq!(rt.host().queued_events(), 1);
}

#[test]
fn back_and_forward_keep_active_route_correct() {
    let mut rt = mounted(1280, "/");
    rt.activate_link("/about").expect("link");
    rt.step().expect("step");
    rt.activate_link("/robotics/").expect("link");
    rt.step().expect("step");
    assert!(rt.is_active("/robotics"));

    assert!(rt.host_mut().go_back());
    rt.step().expect("step");
    assert!(rt.is_active("/about"));
    assert!(!rt.is_active("/robotics"));

    assert!(rt.host_mut().go_forward());
    rt.step().expect("step");
    assert!(rt.is_active("/robotics/"));
}

#[test]
fn document_ready_commits_current_path() {
    let mut rt = mounted(1280, "/about");
    rt.host_mut().load_document();
    let step = rt.step().expect("step");
    assert_eq!(step.events_processed, 1);
    assert_eq!(step.transitions, 0);
    assert!(rt.is_active("/about"));
}

#[test]
fn resize_burst_classifies_once_with_last_width() {
    let mut rt = mounted(800, "/");
    for width in [900, 1100, 700, 1300] {
        rt.host_mut().resize(width);
        rt.step().expect("step");
        rt.host_mut().advance(Duration::from_millis(20));
        rt.step().expect("step");
    }
    assert_eq!(rt.viewport_class(), ViewportClass::Compact);
    rt.host_mut().advance(DEBOUNCE);
    let step = rt.step().expect("step");
    assert_eq!(step.transitions, 1);
    assert_eq!(rt.viewport_class(), ViewportClass::Wide);

    let stats = rt.debouncer().stats();
    assert_eq!((stats.signals, stats.fires, stats.superseded), (4, 1, 3));
    assert_eq!(rt.host().pending_timers(), 0);
}

#[test]
fn burst_returning_to_same_class_notifies_nobody() {
    let (mut rt, seen) = recording(800, "/");
    rt.toggle().expect("toggle");
    let before = seen.borrow().len();
    for width in [1200, 1300, 900] {
        rt.host_mut().resize(width);
        rt.step().expect("step");
    }
    rt.host_mut().advance(DEBOUNCE);
    rt.step().expect("step");
    assert_eq!(seen.borrow().len(), before);
    assert_eq!(rt.menu_state(), MenuState::Open);
    assert!(rt.scroll_locked());
}

#[test]
fn shell_sees_each_change() {
    let (mut rt, seen) = recording(800, "/");
    rt.toggle().expect("toggle");
    resize_and_settle(&mut rt, 1300);
    let opens: Vec<_> = seen.borrow().iter().map(|n| (n.open, n.layout)).collect();
    assert_eq!(
        opens,
        vec![
            (false, MenuLayout::Hidden),
            (true, MenuLayout::OverlayColumn),
            (false, MenuLayout::InlineRow),
        ]
    );
}

#[test]
fn controlled_value_wins_over_toggle_but_not_classification() {
    let mut rt = mounted(1280, "/");
    rt.host_mut().set_controlled(Some(true));
    rt.step().expect("step");
    assert_eq!(rt.menu_state(), MenuState::Open);
    assert!(!rt.scroll_locked());

    resize_and_settle(&mut rt, 800);
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert!(!rt.scroll_locked());

    rt.set_controlled_open(Some(true)).expect("controlled");
    assert!(rt.scroll_locked());
    rt.toggle().expect("toggle");
    assert_eq!(rt.menu_state(), MenuState::Open);

    rt.set_controlled_open(None).expect("withdraw");
    rt.toggle().expect("toggle");
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert_eq!(rt.host().overflow(), Some(Overflow::Auto));
}

#[test]
fn replace_history_mode_is_forwarded() {
    let config = NavConfig::default().with_history(HistoryMode::Replace);
    let mut rt = NavRuntime::new(config, HeadlessHost::new(1280, "/"));
    rt.mount().expect("mount");
    rt.activate_link("/about").expect("link");
    rt.step().expect("step");
    assert_eq!(rt.host().history(), ["/about".to_owned()]);
    assert!(rt.is_active("/about"));
}

#[test]
fn router_failure_still_closes_overlay() {
    let mut rt = mounted(800, "/");
    rt.toggle().expect("toggle");
    rt.host_mut().fail_router("router offline");
    let err = rt.activate_link("/about").expect_err("router fails");
    assert_eq!(err, NavError::Host("router offline".into()));
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert_eq!(rt.host().overflow(), Some(Overflow::Auto));
    assert!(rt.is_active("/"));
}

#[test]
fn rejected_queued_link_does_not_swallow_later_input() {
    let mut rt = mounted(800, "/");
    rt.host_mut().fail_router("offline");
    rt.host_mut().click_link("/about");
    rt.host_mut().press_toggle();

    rt.toggle().expect("direct toggle still applies");
    assert_eq!(rt.host().queued_events(), 0);
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert_eq!(
        rt.host().overflow_writes(),
        [Overflow::Hidden, Overflow::Auto]
    );
    assert!(rt.is_active("/"));
}

#[test]
fn missing_body_is_tolerated() {
    let mut rt = NavRuntime::new(
        NavConfig::default(),
        HeadlessHost::new(800, "/").without_body(),
    );
    rt.mount().expect("mount");
    rt.toggle().expect("toggle");
    rt.unmount();
    assert!(rt.host().overflow_writes().is_empty());
}

#[test]
fn queued_clicks_run_in_arrival_order() {
    let mut rt = mounted(800, "/");
    rt.host_mut().press_toggle();
    rt.host_mut().click_link("/robotics");
    let step = rt.step().expect("step");
    // toggle, link, then the router's page load queued behind them
    assert_eq!(step.events_processed, 3);
    assert_eq!(rt.menu_state(), MenuState::Closed);
    assert_eq!(
        rt.host().overflow_writes(),
        [Overflow::Hidden, Overflow::Auto]
    );
    assert!(rt.is_active("/robotics"));
}

#[test]
fn decision_logs_capture_the_session() {
    let config = NavConfig::default().with_logging(true);
    let mut rt = NavRuntime::new(config, HeadlessHost::new(800, "/"));
    rt.mount().expect("mount");
    rt.toggle().expect("toggle");
    resize_and_settle(&mut rt, 1300);

    let inputs: Vec<_> = rt
        .controller()
        .records()
        .iter()
        .map(|r| r.input)
        .collect();
    assert_eq!(inputs, ["page_loaded", "measure", "toggle", "measure"]);
    assert_eq!(rt.controller().records_jsonl().lines().count(), 4);
    assert_eq!(rt.debouncer().logs().len(), 2);
}
