//! Host and emulated mouse button identifiers, and the mapping between them.
//!
//! The emulated side exposes up to eight buttons, each occupying one bit of
//! the device's button mask (`Button1` = bit 0 … `Button8` = bit 7).  Host
//! toolkits report buttons by role (left, right, …); the [`ButtonMap`] decides
//! which emulated button each role drives.

use serde::{Deserialize, Serialize};

/// A button as reported by the host windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostButton {
    Left,
    Right,
    Middle,
    /// Side button usually bound to "back" (X1).
    Back,
    /// Side button usually bound to "forward" (X2).
    Forward,
    /// Any other vendor-specific button, by host index.
    Extra(u8),
}

/// One of the eight buttons of an emulated mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Button1,
    Button2,
    Button3,
    Button4,
    Button5,
    Button6,
    Button7,
    Button8,
}

impl MouseButton {
    /// All emulated buttons in bit order.
    pub const ALL: [MouseButton; 8] = [
        MouseButton::Button1,
        MouseButton::Button2,
        MouseButton::Button3,
        MouseButton::Button4,
        MouseButton::Button5,
        MouseButton::Button6,
        MouseButton::Button7,
        MouseButton::Button8,
    ];

    /// Returns the button for a 1-based number (`1..=8`), or `None`.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=8 => Some(Self::ALL[usize::from(number - 1)]),
            _ => None,
        }
    }

    /// The 1-based button number.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// The bit this button occupies in a device button mask.
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Maps host button roles to emulated button numbers (`1..=8`).
///
/// `0`, or any number outside `1..=8`, leaves that host button unmapped and
/// its events are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonMap {
    #[serde(default = "default_left")]
    pub left: u8,
    #[serde(default = "default_right")]
    pub right: u8,
    #[serde(default = "default_middle")]
    pub middle: u8,
    #[serde(default = "default_back")]
    pub back: u8,
    #[serde(default = "default_forward")]
    pub forward: u8,
}

fn default_left() -> u8 {
    1
}
fn default_right() -> u8 {
    2
}
fn default_middle() -> u8 {
    3
}
fn default_back() -> u8 {
    4
}
fn default_forward() -> u8 {
    5
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            left: default_left(),
            right: default_right(),
            middle: default_middle(),
            back: default_back(),
            forward: default_forward(),
        }
    }
}

impl ButtonMap {
    /// Resolves a host button to the emulated button it drives.
    pub fn resolve(&self, button: HostButton) -> Option<MouseButton> {
        let number = match button {
            HostButton::Left => self.left,
            HostButton::Right => self.right,
            HostButton::Middle => self.middle,
            HostButton::Back => self.back,
            HostButton::Forward => self.forward,
            HostButton::Extra(_) => return None,
        };
        MouseButton::from_number(number)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
