//! Host input events, already decoded from the windowing toolkit's own types.
//!
//! Coordinates are window-local pixels with the origin at the top-left corner.
//! Wheel deltas use the common "angle delta" unit where one detent of a
//! standard wheel is 120.

use serde::{Deserialize, Serialize};

use super::buttons::HostButton;

/// Identity of a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Keys the capture controller can be configured to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostKey {
    Escape,
    Pause,
    ScrollLock,
    /// Function key `F1`..`F24`, by number.
    Function(u8),
    /// Any other key, by host key code.
    Other(u32),
}

/// Payload of a button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub button: HostButton,
    pub x: i32,
    pub y: i32,
}

/// Payload of a pointer motion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseMoveEvent {
    pub x: i32,
    pub y: i32,
}

/// Payload of a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelEvent {
    /// Horizontal travel; positive = right.
    pub delta_x: i32,
    /// Vertical travel; positive = away from the user.
    pub delta_y: i32,
}

/// An event delivered by the host dispatch mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    ButtonPress(MouseButtonEvent),
    ButtonRelease(MouseButtonEvent),
    Motion(MouseMoveEvent),
    Wheel(WheelEvent),
    KeyPress(HostKey),
    /// The window lost keyboard/pointer focus.
    FocusOut,
    /// Any event kind this layer does not interpret, by host type code.
    Other(u32),
}

impl HostEvent {
    /// Short name used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::ButtonPress(_) => "button_press",
            HostEvent::ButtonRelease(_) => "button_release",
            HostEvent::Motion(_) => "motion",
            HostEvent::Wheel(_) => "wheel",
            HostEvent::KeyPress(_) => "key_press",
            HostEvent::FocusOut => "focus_out",
            HostEvent::Other(_) => "other",
        }
    }
}
