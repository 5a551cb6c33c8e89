//! Per-device state storage shared by the host event thread and the poll thread.
//!
//! # Locking
//!
//! Every device has its own `Mutex<MouseState>`.  A write to device 0 never
//! waits on a poll of device 3.  The slot list itself sits behind an `RwLock`
//! that is only write-locked when the device count is reconfigured; every
//! other operation takes the read side just long enough to clone an `Arc`.
//!
//! A poisoned device lock is recovered rather than propagated; the device
//! keeps its last written values.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::trace;

use super::device::{DeviceSnapshot, MouseState, MouseUpdate};

type Slots = Arc<[Mutex<MouseState>]>;

/// Storage for all emulated mice of one handler.
pub struct DeviceStore {
    slots: RwLock<Slots>,
    wheel_notch: i32,
}

impl DeviceStore {
    /// Creates an empty store.  `wheel_notch` is the number of raw wheel units
    /// per reported notch (120 for a standard wheel).
    pub fn new(wheel_notch: i32) -> Self {
        Self {
            slots: RwLock::new(Arc::from(Vec::new())),
            wheel_notch: wheel_notch.max(1),
        }
    }

    pub fn wheel_notch(&self) -> i32 {
        self.wheel_notch
    }

    /// Replaces all devices with `device_count` fresh, disconnected ones.
    pub fn reset(&self, device_count: u32) {
        let fresh: Vec<Mutex<MouseState>> =
            (0..device_count).map(|_| Mutex::new(MouseState::new())).collect();
        *self.slots.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(fresh);
    }

    /// Number of addressable devices.
    pub fn len(&self) -> u32 {
        self.current().len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.current().is_empty()
    }

    /// Runs `f` on device `index` under that device's lock.
    ///
    /// Returns `None` (and does nothing) when `index` is out of range.
    pub fn apply<R>(&self, index: u32, f: impl FnOnce(&mut MouseState) -> R) -> Option<R> {
        let slots = self.current();
        let Some(slot) = slots.get(index as usize) else {
            trace!(index, devices = slots.len(), "device index out of range, ignoring");
            return None;
        };
        let mut state = lock_device(slot);
        Some(f(&mut state))
    }

    pub fn set_connected(&self, index: u32, connected: bool) -> bool {
        self.apply(index, |state| state.set_connected(connected)).is_some()
    }

    pub fn is_connected(&self, index: u32) -> bool {
        self.apply(index, |state| state.connected()).unwrap_or(false)
    }

    /// Non-destructive copy of device `index`.
    pub fn snapshot(&self, index: u32) -> Option<DeviceSnapshot> {
        self.apply(index, |state| state.snapshot(index))
    }

    /// Drains everything device `index` accumulated since the previous call.
    pub fn take_update(&self, index: u32) -> Option<MouseUpdate> {
        let notch = self.wheel_notch;
        self.apply(index, |state| state.take_update(index, notch))
    }

    fn current(&self) -> Slots {
        Arc::clone(&self.slots.read().unwrap_or_else(PoisonError::into_inner))
    }
}

fn lock_device(slot: &Mutex<MouseState>) -> MutexGuard<'_, MouseState> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
