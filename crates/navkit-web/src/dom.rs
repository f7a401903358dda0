#![forbid(unsafe_code)]

//! Browser host and the `NavMenu` JS export.
//!
//! DOM callbacks never touch the runtime directly: they append to a shared
//! inbox and then try to step the runtime. If the runtime is already busy
//! (a callback fired while it was executing an effect), the event stays in
//! the inbox and the outer step drains it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Function, Object, Reflect};
use navkit_core::NavError;
use navkit_core::event::{HistoryMode, ListenerId, ListenerKind, NavEvent, TimerId};
use navkit_core::scroll_lock::{Overflow, ScrollSurface};
use navkit_runtime::{MenuNotice, NavConfig, NavHost, NavRuntime};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, Window};

type SharedRuntime = Rc<RefCell<NavRuntime<DomHost>>>;

thread_local! {
    static CURRENT: RefCell<Weak<RefCell<NavRuntime<DomHost>>>> = RefCell::new(Weak::new());
}

#[derive(Default)]
struct Pump {
    inbox: RefCell<VecDeque<NavEvent>>,
    runtime: RefCell<Weak<RefCell<NavRuntime<DomHost>>>>,
}

impl Pump {
    fn push(&self, event: NavEvent) {
        self.inbox.borrow_mut().push_back(event);
        self.run();
    }

    fn run(&self) {
        let Some(runtime) = self.runtime.borrow().upgrade() else {
            return;
        };
        let Ok(mut runtime) = runtime.try_borrow_mut() else {
            return;
        };
        if let Err(err) = runtime.step() {
            tracing::warn!(target: "navkit.web", error = %err, "step failed");
        }
    }
}

struct DomListener {
    id: ListenerId,
    target: EventTarget,
    event_type: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

/// [`NavHost`] backed by `window` and `document`.
pub(crate) struct DomHost {
    window: Window,
    pump: Rc<Pump>,
    listeners: Vec<DomListener>,
    armed: Rc<Cell<Option<TimerId>>>,
    timeout: Option<i32>,
    timer_callback: Closure<dyn FnMut()>,
    router: Option<Function>,
    next_id: u64,
}

impl DomHost {
    fn new(window: Window, router: Option<Function>) -> Self {
        let pump = Rc::new(Pump::default());
        let armed = Rc::new(Cell::new(None::<TimerId>));
        let timer_callback = {
            let pump = Rc::clone(&pump);
            let armed = Rc::clone(&armed);
            Closure::wrap(Box::new(move || {
                if let Some(id) = armed.take() {
                    pump.push(NavEvent::TimerElapsed(id));
                }
            }) as Box<dyn FnMut()>)
        };
        Self {
            window,
            pump,
            listeners: Vec::new(),
            armed,
            timeout: None,
            timer_callback,
            router,
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn pathname(window: &Window) -> String {
        window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_owned())
    }

    fn width(window: &Window) -> u32 {
        window
            .inner_width()
            .ok()
            .and_then(|w| w.as_f64())
            .map_or(0, |w| w.max(0.0) as u32)
    }
}

impl ScrollSurface for DomHost {
    fn apply_overflow(&mut self, overflow: Overflow) {
        let Some(body) = self.window.document().and_then(|d| d.body()) else {
            return;
        };
        if let Err(err) = body.style().set_property("overflow", overflow.as_css()) {
            tracing::warn!(target: "navkit.web", error = ?err, "overflow write failed");
        }
    }
}

impl NavHost for DomHost {
    fn now(&self) -> Duration {
        let ms = self.window.performance().map_or(0.0, |p| p.now());
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }

    fn viewport_width(&self) -> u32 {
        Self::width(&self.window)
    }

    fn current_path(&self) -> String {
        Self::pathname(&self.window)
    }

    fn poll_event(&mut self) -> Option<NavEvent> {
        self.pump.inbox.borrow_mut().pop_front()
    }

    fn add_listener(&mut self, kind: ListenerKind) -> Result<ListenerId, NavError> {
        let pump = Rc::clone(&self.pump);
        let window = self.window.clone();
        let target: EventTarget = match kind {
            ListenerKind::Resize => self.window.clone().into(),
            ListenerKind::PageLoad | ListenerKind::DomReady => self
                .window
                .document()
                .ok_or(NavError::MissingElement("document"))?
                .into(),
        };
        let callback = Closure::wrap(Box::new(move |_event: Event| {
            let event = match kind {
                ListenerKind::Resize => NavEvent::Resize {
                    width: DomHost::width(&window),
                },
                ListenerKind::PageLoad | ListenerKind::DomReady => NavEvent::PageLoad {
                    path: DomHost::pathname(&window),
                },
            };
            pump.push(event);
        }) as Box<dyn FnMut(Event)>);

        let event_type = kind.event_type();
        target
            .add_event_listener_with_callback(event_type, callback.as_ref().unchecked_ref())
            .map_err(|_| NavError::Unsupported(event_type))?;

        let id = ListenerId(self.next_id());
        self.listeners.push(DomListener {
            id,
            target,
            event_type,
            callback,
        });
        Ok(id)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let Some(pos) = self.listeners.iter().position(|l| l.id == id) else {
            return;
        };
        let listener = self.listeners.remove(pos);
        let _ = listener.target.remove_event_listener_with_callback(
            listener.event_type,
            listener.callback.as_ref().unchecked_ref(),
        );
    }

    fn set_timer(&mut self, delay: Duration) -> Result<TimerId, NavError> {
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                self.timer_callback.as_ref().unchecked_ref(),
                millis,
            )
            .map_err(|_| NavError::Unsupported("setTimeout"))?;
        let id = TimerId(self.next_id());
        self.timeout = Some(handle);
        self.armed.set(Some(id));
        Ok(id)
    }

    fn clear_timer(&mut self, id: TimerId) {
        if self.armed.get() != Some(id) {
            return;
        }
        self.armed.set(None);
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }

    fn navigate(&mut self, path: &str, history: HistoryMode) -> Result<(), NavError> {
        let Some(router) = &self.router else {
            let location = self.window.location();
            let result = match history {
                HistoryMode::Push => location.assign(path),
                HistoryMode::Replace => location.replace(path),
            };
            return result.map_err(|err| NavError::Host(format!("{err:?}")));
        };
        let options = Object::new();
        Reflect::set(
            &options,
            &JsValue::from_str("history"),
            &JsValue::from_str(history.as_str()),
        )
        .map_err(|err| NavError::Host(format!("{err:?}")))?;
        router
            .call2(&JsValue::NULL, &JsValue::from_str(path), &options)
            .map(|_| ())
            .map_err(|err| NavError::Host(format!("{err:?}")))
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        let ids: Vec<_> = self.listeners.iter().map(|l| l.id).collect();
        for id in ids {
            self.remove_listener(id);
        }
        if let Some(handle) = self.timeout.take() {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

fn to_js(err: NavError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn busy() -> JsValue {
    JsValue::from_str("navigation menu is busy")
}

fn notice_to_js(notice: &MenuNotice) -> JsValue {
    serde_json::to_string(notice)
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

/// Responsive navigation menu bound to the current document.
///
/// ```js
/// const menu = new NavMenu({ breakpoint_px: 1024 }, navigate, (state) => render(state));
/// menu.mount();
/// ```
#[wasm_bindgen]
pub struct NavMenu {
    runtime: SharedRuntime,
}

#[wasm_bindgen]
impl NavMenu {
    /// `options` is a plain object using [`NavConfig`] field names.
    /// `router(path, { history })` performs client-side navigation; without
    /// it, links fall back to a full page load. `on_change(state)` receives
    /// `{ open, class, layout }` whenever the menu changes.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: Option<Object>,
        router: Option<Function>,
        on_change: Option<Function>,
    ) -> Result<NavMenu, JsValue> {
        let config = match options {
            Some(options) => {
                let json: String = js_sys::JSON::stringify(&options)?.into();
                NavConfig::from_json(&json).map_err(to_js)?
            }
            None => NavConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| to_js(NavError::MissingElement("window")))?;
        let host = DomHost::new(window, router);
        let pump = Rc::clone(&host.pump);

        let mut runtime = NavRuntime::new(config, host);
        if let Some(callback) = on_change {
            runtime = runtime.with_notifier(move |notice| {
                if let Err(err) = callback.call1(&JsValue::NULL, &notice_to_js(notice)) {
                    tracing::warn!(target: "navkit.web", error = ?err, "shell callback threw");
                }
            });
        }
        let runtime = Rc::new(RefCell::new(runtime));
        *pump.runtime.borrow_mut() = Rc::downgrade(&runtime);
        Ok(Self { runtime })
    }

    /// Register listeners and classify the current viewport.
    ///
    /// Any other mounted menu on the page is torn down first.
    pub fn mount(&self) -> Result<(), JsValue> {
        let previous = CURRENT.with(|slot| slot.replace(Rc::downgrade(&self.runtime)));
        if let Some(previous) = previous.upgrade()
            && !Rc::ptr_eq(&previous, &self.runtime)
        {
            match previous.try_borrow_mut() {
                Ok(mut previous) => previous.unmount(),
                Err(_) => tracing::warn!(
                    target: "navkit.web",
                    "previous menu is busy and stays mounted; call destroy() on it"
                ),
            }
        }
        self.runtime
            .try_borrow_mut()
            .map_err(|_| busy())?
            .mount()
            .map_err(to_js)
    }

    /// Flip the menu. Returns whether it is now open.
    pub fn toggle(&self) -> Result<bool, JsValue> {
        let mut runtime = self.runtime.try_borrow_mut().map_err(|_| busy())?;
        let transition = runtime.toggle().map_err(to_js)?;
        Ok(transition.to.is_open())
    }

    /// Assert (`true`/`false`) or withdraw (`undefined`) the open value.
    #[wasm_bindgen(js_name = setControlledOpen)]
    pub fn set_controlled_open(&self, open: Option<bool>) -> Result<(), JsValue> {
        let mut runtime = self.runtime.try_borrow_mut().map_err(|_| busy())?;
        runtime.set_controlled_open(open).map(|_| ()).map_err(to_js)
    }

    /// Handle a link click. Returns whether the compact overlay was closed.
    ///
    /// `event`'s default action is suppressed before anything else runs, so
    /// a busy menu or a throwing router never falls through to a full page
    /// load.
    #[wasm_bindgen(js_name = activateLink)]
    pub fn activate_link(&self, href: &str, event: Option<Event>) -> Result<bool, JsValue> {
        crate::intercept_link(
            || {
                if let Some(event) = &event {
                    event.prevent_default();
                }
            },
            || -> Result<bool, JsValue> {
                let mut runtime = self.runtime.try_borrow_mut().map_err(|_| busy())?;
                let outcome = runtime.activate_link(href).map_err(to_js)?;
                Ok(outcome.closed_overlay)
            },
        )
    }

    /// Whether `path` is the committed route.
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self, path: &str) -> bool {
        self.runtime
            .try_borrow()
            .is_ok_and(|runtime| runtime.is_active(path))
    }

    /// `"inline_row"`, `"overlay_column"`, or `"hidden"`.
    pub fn layout(&self) -> String {
        self.runtime
            .try_borrow()
            .map(|runtime| runtime.layout().label())
            .unwrap_or("inline_row")
            .to_owned()
    }

    /// Remove listeners, cancel the pending timer, and release the scroll lock.
    pub fn destroy(&self) {
        if let Ok(mut runtime) = self.runtime.try_borrow_mut() {
            runtime.unmount();
        }
    }
}
