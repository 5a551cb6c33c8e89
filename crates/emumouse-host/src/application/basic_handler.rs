//! BasicMouseHandler: drives one emulated mouse from a single host window.
//!
//! The handler is installed as an [`EventObserver`] on its target window.  The
//! host's dispatch loop calls [`EventObserver::event_filter`] for every event
//! on that window; the handler translates pointer events into writes on the
//! active device and manages pointer capture.
//!
//! # Capture
//!
//! While unlocked, pointer input is dropped (unless `forward_while_unlocked`
//! is configured), except that pressing the trigger button engages capture and
//! is then applied like any other press.  While locked on a window that
//! supports relative motion, every motion event is turned into a delta from
//! the last reported host pointer position and the host cursor is warped back
//! to the centre, so the emulated software sees an unbounded stream of
//! relative motion.
//!
//! # Threads
//!
//! Every method takes `&self`.  The host dispatch thread writes, the device
//! registry's poll thread reads through [`MouseHandler`]; the only lock they
//! can share is the per-device one inside the store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};
use std::time::Instant;

use emumouse_core::{
    ButtonMap, CaptureController, CaptureSettings, CaptureState, EventNormalizer, HandlerError,
    HandlerKind, HostButton, HostEvent, Motion, MouseButtonEvent, MouseHandler, MouseHandlerBase,
    MouseMoveEvent, WheelEvent, WindowId, DEFAULT_WHEEL_NOTCH,
};
use emumouse_core::normalize::window_center;
use tracing::{debug, trace};

use crate::infrastructure::host_window::{EventObserver, HostWindow};
use crate::infrastructure::storage::config::AppConfig;

/// Construction parameters for [`BasicMouseHandler`].
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOptions {
    /// Device index host input is written to.
    pub active_device: u32,
    /// Whether handled pointer events are reported as consumed.
    pub consume_events: bool,
    pub wheel_notch: i32,
    pub capture: CaptureSettings,
    pub buttons: ButtonMap,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            active_device: 0,
            consume_events: true,
            wheel_notch: DEFAULT_WHEEL_NOTCH,
            capture: CaptureSettings::default(),
            buttons: ButtonMap::default(),
        }
    }
}

impl HandlerOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            active_device: config.handler.active_device,
            consume_events: config.handler.consume_events,
            wheel_notch: config.handler.wheel_notch,
            capture: config.capture,
            buttons: config.buttons,
        }
    }
}

/// `target_id` value while no window is bound.
const UNBOUND: u64 = u64::MAX;

/// The currently bound window.
struct Target {
    id: WindowId,
    window: Weak<dyn HostWindow>,
}

/// Mouse backend fed by a host window's events.
pub struct BasicMouseHandler {
    base: MouseHandlerBase,
    normalizer: EventNormalizer,
    capture: CaptureController,
    active_device: u32,
    consume_events: bool,
    target: RwLock<Option<Target>>,
    /// Raw id of the bound window, or [`UNBOUND`].  Written under the
    /// `target` write lock; read lock-free by the event filter.
    target_id: AtomicU64,
    /// Last host pointer position on the bound window, window-local.
    pointer: Mutex<Option<(i32, i32)>>,
    self_ref: Weak<BasicMouseHandler>,
}

impl BasicMouseHandler {
    /// Creates an unbound, unlocked handler with no devices.  Call
    /// [`MouseHandler::init`] before expecting device state.
    pub fn new(options: HandlerOptions) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            base: MouseHandlerBase::new(options.wheel_notch),
            normalizer: EventNormalizer::new(options.buttons, options.wheel_notch),
            capture: CaptureController::new(options.capture),
            active_device: options.active_device,
            consume_events: options.consume_events,
            target: RwLock::new(None),
            target_id: AtomicU64::new(UNBOUND),
            pointer: Mutex::new(None),
            self_ref: self_ref.clone(),
        })
    }

    // ── Window binding ────────────────────────────────────────────────────────

    /// Binds the handler to `window`, or unbinds it with `None`.
    ///
    /// The handler is removed as observer from the previous window and any
    /// capture held there is released.  Rebinding the same window is a no-op.
    pub fn set_target_window(&self, window: Option<&Arc<dyn HostWindow>>) {
        let next = window.map(|w| Target {
            id: w.id(),
            window: Arc::downgrade(w),
        });

        let previous = {
            let mut target = self.target.write().unwrap_or_else(PoisonError::into_inner);
            if let (Some(current), Some(next)) = (target.as_ref(), next.as_ref()) {
                let same_window = Weak::ptr_eq(&current.window, &next.window);
                if same_window && current.window.strong_count() > 0 {
                    return;
                }
            }
            let next_id = next.as_ref().map_or(UNBOUND, |t| t.id.0);
            self.target_id.store(next_id, Ordering::Release);
            std::mem::replace(&mut *target, next)
        };
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = None;

        let observer = self.observer_handle();
        if let Some(previous) = previous {
            let old_window = previous.window.upgrade();
            self.release_capture(old_window.as_deref());
            if let Some(old_window) = old_window {
                old_window.remove_observer(&observer);
            }
            debug!(window = previous.id.0, "unbound from target window");
        }

        if let Some(window) = window {
            window.install_observer(observer);
            debug!(window = window.id().0, "bound to target window");
        }
    }

    /// Identity of the bound window, if any.
    pub fn target_window_id(&self) -> Option<WindowId> {
        match self.target_id.load(Ordering::Acquire) {
            UNBOUND => None,
            id => Some(WindowId(id)),
        }
    }

    fn target_window(&self) -> Option<Arc<dyn HostWindow>> {
        self.bound_window().map(|(_, window)| window)
    }

    /// Id and live handle of the bound window, read together.
    fn bound_window(&self) -> Option<(WindowId, Arc<dyn HostWindow>)> {
        let target = self.target.read().unwrap_or_else(PoisonError::into_inner);
        let target = target.as_ref()?;
        Some((target.id, target.window.upgrade()?))
    }

    fn observer_handle(&self) -> Weak<dyn EventObserver> {
        self.self_ref.clone()
    }

    // ── Capture ───────────────────────────────────────────────────────────────

    /// `true` while pointer capture is engaged.  Never blocks.
    pub fn get_mouse_lock_state(&self) -> bool {
        self.capture.is_locked()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    /// Engages (`true`) or releases (`false`) capture programmatically.
    ///
    /// Engaging requires a bound, live window.  Returns `true` if the state
    /// changed.
    pub fn request_capture(&self, engage: bool) -> bool {
        let window = self.target_window();
        if engage {
            match window {
                Some(window) => self.engage_capture(window.as_ref()),
                None => {
                    trace!("capture requested without a target window");
                    false
                }
            }
        } else {
            self.release_capture(window.as_deref())
        }
    }

    /// Locks capture.  When the host pointer position is not yet known, the
    /// cursor is warped to the centre so the first relative delta has an
    /// anchor.
    fn engage_capture(&self, window: &dyn HostWindow) -> bool {
        if !self.capture.lock() {
            return false;
        }
        window.set_cursor_captured(true);
        if window.supports_relative_motion() {
            let mut pointer = self.pointer.lock().unwrap_or_else(PoisonError::into_inner);
            if pointer.is_none() {
                let center = window_center(window.size());
                let warped = self.base.store().apply(self.active_device, |_| {
                    window.warp_cursor(center.0, center.1);
                });
                if warped.is_some() {
                    *pointer = Some(center);
                }
            }
        }
        true
    }

    fn release_capture(&self, window: Option<&dyn HostWindow>) -> bool {
        if !self.capture.unlock() {
            return false;
        }
        if let Some(window) = window {
            window.set_cursor_captured(false);
        }
        // Releases are gated out from now on; nothing may stay held.
        self.base
            .store()
            .apply(self.active_device, |state| state.release_all_buttons(Instant::now()));
        true
    }

    // ── Event translation ─────────────────────────────────────────────────────

    pub fn mouse_button_down(&self, event: &MouseButtonEvent) {
        let Some(window) = self.target_window() else {
            trace!("no target window, dropping button press");
            return;
        };
        self.button_down_on(window.as_ref(), event);
    }

    pub fn mouse_button_up(&self, event: &MouseButtonEvent) {
        if self.target_window().is_none() {
            trace!("no target window, dropping button release");
            return;
        }
        self.button_up_on(event);
    }

    pub fn mouse_scroll(&self, event: &WheelEvent) {
        if self.target_window().is_none() {
            trace!("no target window, dropping wheel");
            return;
        }
        self.scroll_on(event);
    }

    pub fn mouse_move(&self, event: &MouseMoveEvent) {
        let Some(window) = self.target_window() else {
            trace!("no target window, dropping motion");
            return;
        };
        self.move_on(window.as_ref(), event);
    }

    fn button_down_on(&self, window: &dyn HostWindow, event: &MouseButtonEvent) {
        self.note_pointer(event.x, event.y);
        if !self.capture.is_locked() && self.capture.is_trigger(event.button) {
            self.engage_capture(window);
        }
        self.apply_button(event.button, true);
    }

    fn button_up_on(&self, event: &MouseButtonEvent) {
        self.note_pointer(event.x, event.y);
        self.apply_button(event.button, false);
    }

    fn apply_button(&self, button: HostButton, pressed: bool) {
        if !self.capture.forwards_input() {
            return;
        }
        let Some(mapped) = self.normalizer.button(button) else {
            trace!(?button, "unmapped host button");
            return;
        };
        self.base.store().apply(self.active_device, |state| {
            state.set_button(mapped, pressed, Instant::now())
        });
    }

    fn scroll_on(&self, event: &WheelEvent) {
        if !self.capture.forwards_input() {
            return;
        }
        let (delta_x, delta_y) = self.normalizer.wheel(event);
        let notch = self.normalizer.wheel_notch();
        self.base.store().apply(self.active_device, |state| {
            state.accumulate_scroll(delta_x, delta_y, notch, Instant::now())
        });
    }

    fn move_on(&self, window: &dyn HostWindow, event: &MouseMoveEvent) {
        let mut pointer = self.pointer.lock().unwrap_or_else(PoisonError::into_inner);
        let reported = (event.x, event.y);
        if !self.capture.forwards_input() {
            *pointer = Some(reported);
            return;
        }

        let (width, height) = window.size();
        let anchor = (self.capture.is_locked() && window.supports_relative_motion())
            .then(|| pointer.unwrap_or_else(|| window_center((width, height))));
        match self.normalizer.motion(event, (width, height), anchor) {
            Motion::Stationary => {}
            Motion::Relative { dx, dy, center } => {
                // Warp inside the device lock so a poll never sees the delta
                // without the matching re-centre.
                let warped = self.base.store().apply(self.active_device, |state| {
                    window.warp_cursor(center.0, center.1);
                    state.move_relative(dx, dy, width, height, Instant::now());
                });
                *pointer = Some(if warped.is_some() { center } else { reported });
            }
            Motion::Absolute { x, y } => {
                self.base.store().apply(self.active_device, |state| {
                    state.move_absolute(x, y, width, height, Instant::now())
                });
                *pointer = Some(reported);
            }
        }
    }

    fn note_pointer(&self, x: i32, y: i32) {
        *self.pointer.lock().unwrap_or_else(PoisonError::into_inner) = Some((x, y));
    }
}

impl MouseHandler for BasicMouseHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Basic
    }

    fn init(&self, max_connect: u32) -> Result<(), HandlerError> {
        self.base.init_devices(max_connect, &[self.active_device])
    }

    fn base(&self) -> &MouseHandlerBase {
        &self.base
    }
}

impl EventObserver for BasicMouseHandler {
    fn event_filter(&self, source: WindowId, event: &HostEvent) -> bool {
        if self.target_window_id() != Some(source) {
            return false;
        }
        // The window handled below must be the one the event came from, even
        // if a rebind lands after the check above.
        let Some((bound_id, window)) = self.bound_window() else {
            return false;
        };
        if bound_id != source {
            return false;
        }
        let window = window.as_ref();

        match event {
            HostEvent::ButtonPress(e) => {
                self.button_down_on(window, e);
                self.consume_events
            }
            HostEvent::ButtonRelease(e) => {
                self.button_up_on(e);
                self.consume_events
            }
            HostEvent::Motion(e) => {
                self.move_on(window, e);
                self.consume_events
            }
            HostEvent::Wheel(e) => {
                self.scroll_on(e);
                self.consume_events
            }
            HostEvent::KeyPress(key) => {
                self.capture.is_release_key(*key) && self.release_capture(Some(window))
            }
            HostEvent::FocusOut => {
                if self.capture.settings().release_on_focus_loss {
                    self.release_capture(Some(window));
                }
                false
            }
            HostEvent::Other(_) => {
                trace!(kind = event.kind(), "passing through unhandled event");
                false
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
