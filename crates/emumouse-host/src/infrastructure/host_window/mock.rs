//! Mock host window for tests and the headless harness.
//!
//! Records every side effect the handler performs on the host (cursor warps,
//! capture changes) and lets callers deliver synthetic events to the installed
//! observers, as a real toolkit's dispatch loop would.

use std::sync::{Mutex, Weak};

use emumouse_core::{HostEvent, WindowId};

use super::{EventObserver, HostWindow};

/// A host window that records calls instead of talking to a window system.
pub struct MockHostWindow {
    id: WindowId,
    size: Mutex<(u32, u32)>,
    relative_motion: bool,
    observers: Mutex<Vec<Weak<dyn EventObserver>>>,
    /// Every `warp_cursor` call, in order.
    pub warps: Mutex<Vec<(i32, i32)>>,
    /// Every `set_cursor_captured` call, in order.
    pub capture_calls: Mutex<Vec<bool>>,
}

impl MockHostWindow {
    /// Creates a window of `width` x `height` that supports relative motion.
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self::with_relative_motion(id, width, height, true)
    }

    pub fn with_relative_motion(id: u64, width: u32, height: u32, relative_motion: bool) -> Self {
        Self {
            id: WindowId(id),
            size: Mutex::new((width, height)),
            relative_motion,
            observers: Mutex::new(Vec::new()),
            warps: Mutex::new(Vec::new()),
            capture_calls: Mutex::new(Vec::new()),
        }
    }

    /// Simulates a resize by the window system.
    pub fn resize(&self, width: u32, height: u32) {
        *self.size.lock().expect("lock poisoned") = (width, height);
    }

    /// Delivers `event` to every live observer, in installation order, until
    /// one consumes it.  Returns whether it was consumed.
    pub fn dispatch(&self, event: HostEvent) -> bool {
        // Snapshot the list so observers may rebind windows from inside the
        // callback without deadlocking on `observers`.
        let observers: Vec<_> = self.observers.lock().expect("lock poisoned").clone();
        observers
            .iter()
            .filter_map(Weak::upgrade)
            .any(|observer| observer.event_filter(self.id, &event))
    }

    /// Number of observers currently installed and still alive.
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|o| o.strong_count() > 0)
            .count()
    }

    pub fn warp_count(&self) -> usize {
        self.warps.lock().expect("lock poisoned").len()
    }

    /// Last capture state requested by the handler (`false` if never set).
    pub fn is_cursor_captured(&self) -> bool {
        self.capture_calls
            .lock()
            .expect("lock poisoned")
            .last()
            .copied()
            .unwrap_or(false)
    }
}

impl HostWindow for MockHostWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        *self.size.lock().expect("lock poisoned")
    }

    fn supports_relative_motion(&self) -> bool {
        self.relative_motion
    }

    fn warp_cursor(&self, x: i32, y: i32) {
        self.warps.lock().expect("lock poisoned").push((x, y));
    }

    fn set_cursor_captured(&self, captured: bool) {
        self.capture_calls.lock().expect("lock poisoned").push(captured);
    }

    fn install_observer(&self, observer: Weak<dyn EventObserver>) {
        let mut observers = self.observers.lock().expect("lock poisoned");
        if !observers.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            observers.push(observer);
        }
    }

    fn remove_observer(&self, observer: &Weak<dyn EventObserver>) {
        self.observers
            .lock()
            .expect("lock poisoned")
            .retain(|o| !Weak::ptr_eq(o, observer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingObserver {
        seen: Mutex<Vec<(WindowId, HostEvent)>>,
        consume: bool,
    }

    impl EventObserver for CountingObserver {
        fn event_filter(&self, source: WindowId, event: &HostEvent) -> bool {
            self.seen.lock().unwrap().push((source, *event));
            self.consume
        }
    }

    #[test]
    fn test_dispatch_reaches_installed_observer() {
        // Arrange
        let window = MockHostWindow::new(7, 800, 600);
        let observer = Arc::new(CountingObserver::default());
        let weak = Arc::downgrade(&observer) as Weak<dyn EventObserver>;
        window.install_observer(weak);

        // Act
        let consumed = window.dispatch(HostEvent::FocusOut);

        // Assert
        assert!(!consumed);
        let seen = observer.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[(WindowId(7), HostEvent::FocusOut)]);
    }

    #[test]
    fn test_installing_twice_registers_once() {
        let window = MockHostWindow::new(1, 10, 10);
        let observer = Arc::new(CountingObserver::default());
        let weak = Arc::downgrade(&observer) as Weak<dyn EventObserver>;

        window.install_observer(weak.clone());
        window.install_observer(weak);

        assert_eq!(window.observer_count(), 1);
    }

    #[test]
    fn test_removed_observer_no_longer_receives_events() {
        let window = MockHostWindow::new(1, 10, 10);
        let observer = Arc::new(CountingObserver::default());
        let weak = Arc::downgrade(&observer) as Weak<dyn EventObserver>;
        window.install_observer(weak.clone());

        window.remove_observer(&weak);
        window.dispatch(HostEvent::Other(0));

        assert!(observer.seen.lock().unwrap().is_empty());
        assert_eq!(window.observer_count(), 0);
    }

    #[test]
    fn test_dropped_observer_is_skipped() {
        let window = MockHostWindow::new(1, 10, 10);
        let observer = Arc::new(CountingObserver {
            consume: true,
            ..CountingObserver::default()
        });
        let weak = Arc::downgrade(&observer) as Weak<dyn EventObserver>;
        window.install_observer(weak);
        drop(observer);

        assert!(!window.dispatch(HostEvent::FocusOut));
        assert_eq!(window.observer_count(), 0);
    }

    #[test]
    fn test_records_host_side_effects() {
        let window = MockHostWindow::new(1, 10, 10);

        window.warp_cursor(5, 5);
        window.set_cursor_captured(true);

        assert_eq!(window.warp_count(), 1);
        assert!(window.is_cursor_captured());
    }
}
