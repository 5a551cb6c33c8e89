//! Conversion of host event payloads into canonical units.
//!
//! | Host payload                 | Canonical form                             |
//! |------------------------------|--------------------------------------------|
//! | host button role             | [`MouseButton`] via the [`ButtonMap`]      |
//! | window-local motion          | [`Motion::Absolute`] clamped to the window |
//! | motion while captured        | [`Motion::Relative`] delta from the anchor |
//! | wheel angle delta            | raw units; whole notches on consumption    |
//!
//! Everything here is a pure function of its inputs.

use crate::domain::buttons::{ButtonMap, HostButton, MouseButton};
use crate::domain::events::{MouseMoveEvent, WheelEvent};

/// Raw wheel units per detent of a standard wheel.
pub const DEFAULT_WHEEL_NOTCH: i32 = 120;

/// A motion event reduced to what the device store needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Absolute position inside the window.
    Absolute { x: i32, y: i32 },
    /// Displacement from the anchor; the host cursor must be warped back to
    /// `center` afterwards.
    Relative { dx: i32, dy: i32, center: (i32, i32) },
    /// The pointer is still at the anchor, e.g. the echo of a previous warp.
    Stationary,
}

/// Stateless translator from host payloads to canonical units.
#[derive(Debug, Clone, Copy)]
pub struct EventNormalizer {
    buttons: ButtonMap,
    wheel_notch: i32,
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new(ButtonMap::default(), DEFAULT_WHEEL_NOTCH)
    }
}

impl EventNormalizer {
    pub fn new(buttons: ButtonMap, wheel_notch: i32) -> Self {
        Self {
            buttons,
            wheel_notch: wheel_notch.max(1),
        }
    }

    pub fn wheel_notch(&self) -> i32 {
        self.wheel_notch
    }

    /// Emulated button driven by `button`, or `None` if it is unmapped.
    pub fn button(&self, button: HostButton) -> Option<MouseButton> {
        self.buttons.resolve(button)
    }

    /// Wheel travel as `(horizontal, vertical)` raw units.
    pub fn wheel(&self, event: &WheelEvent) -> (i32, i32) {
        (event.delta_x, event.delta_y)
    }

    /// Converts a motion event for a window of `size` pixels.
    ///
    /// With an `anchor` (the last known host pointer position) the result is
    /// the displacement from it; without one, the clamped absolute position.
    pub fn motion(
        &self,
        event: &MouseMoveEvent,
        size: (u32, u32),
        anchor: Option<(i32, i32)>,
    ) -> Motion {
        if let Some((anchor_x, anchor_y)) = anchor {
            let dx = event.x.saturating_sub(anchor_x);
            let dy = event.y.saturating_sub(anchor_y);
            if dx == 0 && dy == 0 {
                return Motion::Stationary;
            }
            return Motion::Relative {
                dx,
                dy,
                center: window_center(size),
            };
        }
        let (x, y) = clamp_to_window(event.x, event.y, size);
        Motion::Absolute { x, y }
    }
}

/// Centre of a window of `size` pixels, rounded down.
pub fn window_center(size: (u32, u32)) -> (i32, i32) {
    (extent_to_i32(size.0) / 2, extent_to_i32(size.1) / 2)
}

/// Clamps a window-local point to `[0, w-1] x [0, h-1]`.
pub fn clamp_to_window(x: i32, y: i32, size: (u32, u32)) -> (i32, i32) {
    let max_x = (extent_to_i32(size.0) - 1).max(0);
    let max_y = (extent_to_i32(size.1) - 1).max(0);
    (x.clamp(0, max_x), y.clamp(0, max_y))
}

fn extent_to_i32(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
