//! State of a single emulated mouse.
//!
//! [`MouseState`] is written by the host event thread and read by the
//! emulator's poll thread, always behind the per-device lock held by
//! [`DeviceStore`](super::store::DeviceStore).  Two views leave the store:
//!
//! - [`DeviceSnapshot`] – a non-destructive copy of the current state.
//! - [`MouseUpdate`] – what a poll consumes: the current state plus everything
//!   that accumulated since the previous poll (relative motion, whole wheel
//!   notches, and the queued [`MouseData`] records).
//!
//! Buttons and absolute position are last-write-wins.  Relative motion and
//! wheel travel accumulate until consumed.

use std::collections::VecDeque;
use std::time::Instant;

use super::buttons::MouseButton;

/// Capacity of the per-device data list; the oldest record is dropped first.
pub const MOUSE_MAX_DATA_LIST_NUM: usize = 8;

/// One queued state-change record, in the emulated device's own units.
///
/// Axis and wheel values are clamped to `i8`, matching what a real mouse
/// report can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseData {
    pub buttons: u8,
    pub x_axis: i8,
    pub y_axis: i8,
    pub wheel: i8,
    pub tilt: i8,
    pub timestamp: Instant,
}

/// Mutable state of one emulated mouse.
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    connected: bool,
    buttons: u8,
    x_pos: i32,
    y_pos: i32,
    x_max: u32,
    y_max: u32,
    rel_x: i32,
    rel_y: i32,
    wheel_units: i32,
    tilt_units: i32,
    data_list: VecDeque<MouseData>,
    last_update: Option<Instant>,
}

fn clamp_axis(value: i32) -> i8 {
    value.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8
}

fn clamp_to_extent(value: i32, extent: u32) -> i32 {
    let upper = i32::try_from(extent).unwrap_or(i32::MAX).saturating_sub(1).max(0);
    value.clamp(0, upper)
}

impl MouseState {
    /// Creates a disconnected device with no extent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Current button mask.
    pub fn buttons(&self) -> u8 {
        self.buttons
    }

    /// Current position in window pixels.
    pub fn position(&self) -> (i32, i32) {
        (self.x_pos, self.y_pos)
    }

    /// Sets or clears one button.
    ///
    /// Returns `true` if the mask changed.  Repeating a press (or a release)
    /// leaves the mask as it is and queues nothing.
    pub fn set_button(&mut self, button: MouseButton, pressed: bool, now: Instant) -> bool {
        let next = if pressed {
            self.buttons | button.bit()
        } else {
            self.buttons & !button.bit()
        };
        if next == self.buttons {
            return false;
        }
        self.buttons = next;
        self.push_record(0, 0, 0, 0, now);
        true
    }

    /// Clears every held button.  Returns `true` if any button was held.
    pub fn release_all_buttons(&mut self, now: Instant) -> bool {
        if self.buttons == 0 {
            return false;
        }
        self.buttons = 0;
        self.push_record(0, 0, 0, 0, now);
        true
    }

    /// Adds wheel travel in raw host units.
    ///
    /// `notch` is the number of raw units per wheel detent; it only affects the
    /// queued record, never the accumulated totals.
    pub fn accumulate_scroll(&mut self, delta_x: i32, delta_y: i32, notch: i32, now: Instant) {
        self.tilt_units = self.tilt_units.saturating_add(delta_x);
        self.wheel_units = self.wheel_units.saturating_add(delta_y);
        let notch = notch.max(1);
        self.push_record(0, 0, clamp_axis(delta_y / notch), clamp_axis(delta_x / notch), now);
    }

    /// Moves to an absolute window position, clamped to the given extent.
    pub fn move_absolute(&mut self, x: i32, y: i32, x_max: u32, y_max: u32, now: Instant) {
        let x = clamp_to_extent(x, x_max);
        let y = clamp_to_extent(y, y_max);
        let dx = x - self.x_pos;
        let dy = y - self.y_pos;
        self.x_pos = x;
        self.y_pos = y;
        self.x_max = x_max;
        self.y_max = y_max;
        self.rel_x = self.rel_x.saturating_add(dx);
        self.rel_y = self.rel_y.saturating_add(dy);
        self.push_record(clamp_axis(dx), clamp_axis(dy), 0, 0, now);
    }

    /// Applies a relative motion.
    ///
    /// The full delta accumulates for the consumer; the tracked position
    /// follows it but stays inside the extent.
    pub fn move_relative(&mut self, dx: i32, dy: i32, x_max: u32, y_max: u32, now: Instant) {
        self.rel_x = self.rel_x.saturating_add(dx);
        self.rel_y = self.rel_y.saturating_add(dy);
        self.x_pos = clamp_to_extent(self.x_pos.saturating_add(dx), x_max);
        self.y_pos = clamp_to_extent(self.y_pos.saturating_add(dy), y_max);
        self.x_max = x_max;
        self.y_max = y_max;
        self.push_record(clamp_axis(dx), clamp_axis(dy), 0, 0, now);
    }

    fn push_record(&mut self, x_axis: i8, y_axis: i8, wheel: i8, tilt: i8, now: Instant) {
        if self.data_list.len() >= MOUSE_MAX_DATA_LIST_NUM {
            self.data_list.pop_front();
        }
        self.data_list.push_back(MouseData {
            buttons: self.buttons,
            x_axis,
            y_axis,
            wheel,
            tilt,
            timestamp: now,
        });
        self.last_update = Some(now);
    }

    /// Copies the current state without consuming anything.
    pub fn snapshot(&self, index: u32) -> DeviceSnapshot {
        DeviceSnapshot {
            index,
            connected: self.connected,
            buttons: self.buttons,
            x: self.x_pos,
            y: self.y_pos,
            x_max: self.x_max,
            y_max: self.y_max,
            delta_x: self.rel_x,
            delta_y: self.rel_y,
            wheel_units: self.wheel_units,
            tilt_units: self.tilt_units,
            queued_records: self.data_list.len(),
            last_update: self.last_update,
        }
    }

    /// Consumes everything accumulated since the previous call.
    ///
    /// Wheel travel is reported in whole notches; the sub-notch remainder stays
    /// behind so that slow, high-resolution scrolling is not lost.
    pub fn take_update(&mut self, index: u32, notch: i32) -> MouseUpdate {
        let notch = notch.max(1);
        let wheel = self.wheel_units / notch;
        let tilt = self.tilt_units / notch;
        self.wheel_units -= wheel * notch;
        self.tilt_units -= tilt * notch;

        let update = MouseUpdate {
            index,
            connected: self.connected,
            buttons: self.buttons,
            x: self.x_pos,
            y: self.y_pos,
            x_max: self.x_max,
            y_max: self.y_max,
            delta_x: self.rel_x,
            delta_y: self.rel_y,
            wheel,
            tilt,
            data: self.data_list.drain(..).collect(),
            last_update: self.last_update,
        };
        self.rel_x = 0;
        self.rel_y = 0;
        update
    }
}

fn normalize(pos: i32, extent: u32) -> f32 {
    if extent <= 1 {
        return 0.0;
    }
    (pos as f32 / (extent - 1) as f32).clamp(0.0, 1.0)
}

/// Read-only copy of a device's state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub index: u32,
    pub connected: bool,
    pub buttons: u8,
    pub x: i32,
    pub y: i32,
    pub x_max: u32,
    pub y_max: u32,
    /// Relative motion accumulated since the last poll.
    pub delta_x: i32,
    pub delta_y: i32,
    /// Raw wheel units accumulated since the last poll.
    pub wheel_units: i32,
    pub tilt_units: i32,
    pub queued_records: usize,
    pub last_update: Option<Instant>,
}

impl DeviceSnapshot {
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons & button.bit() != 0
    }

    /// Position scaled to `[0.0, 1.0]` on both axes.
    pub fn normalized_position(&self) -> (f32, f32) {
        (normalize(self.x, self.x_max), normalize(self.y, self.y_max))
    }
}

/// What one poll of a device consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseUpdate {
    pub index: u32,
    pub connected: bool,
    pub buttons: u8,
    pub x: i32,
    pub y: i32,
    pub x_max: u32,
    pub y_max: u32,
    pub delta_x: i32,
    pub delta_y: i32,
    /// Whole wheel notches.
    pub wheel: i32,
    pub tilt: i32,
    pub data: Vec<MouseData>,
    pub last_update: Option<Instant>,
}

impl MouseUpdate {
    /// `true` when nothing moved, scrolled or changed since the previous poll.
    pub fn is_idle(&self) -> bool {
        self.delta_x == 0 && self.delta_y == 0 && self.wheel == 0 && self.tilt == 0 && self.data.is_empty()
    }

    pub fn normalized_position(&self) -> (f32, f32) {
        (normalize(self.x, self.x_max), normalize(self.y, self.y_max))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
