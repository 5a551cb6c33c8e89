//! Host window abstraction.
//!
//! The windowing toolkit is an external collaborator.  This module defines the
//! contract the mouse handler expects from it:
//!
//! - [`HostWindow`] – a window that can report its size, move and capture the
//!   host cursor, and accept event observers.
//! - [`EventObserver`] – the callback a window invokes for every event before
//!   its default handling.  Returning `true` consumes the event.
//!
//! A toolkit adapter implements `HostWindow` for its own window type; tests
//! use [`mock::MockHostWindow`].
//!
//! # Ownership
//!
//! Windows hold observers weakly and the handler holds its target window
//! weakly, so neither keeps the other alive.

use std::sync::Weak;

use emumouse_core::{HostEvent, WindowId};

pub mod mock;

/// Callback installed on a host window.
///
/// Runs on the host's event-dispatch thread; implementations must not block.
pub trait EventObserver: Send + Sync {
    /// Inspects `event` from window `source`.  Returns `true` if consumed.
    fn event_filter(&self, source: WindowId, event: &HostEvent) -> bool;
}

/// A window of the host windowing toolkit.
pub trait HostWindow: Send + Sync {
    fn id(&self) -> WindowId;

    /// Client-area size in pixels.
    fn size(&self) -> (u32, u32);

    /// Whether the cursor can be warped to produce unbounded relative motion.
    fn supports_relative_motion(&self) -> bool;

    /// Moves the host cursor to window-local `(x, y)`.
    fn warp_cursor(&self, x: i32, y: i32);

    /// Hides and confines (`true`) or restores (`false`) the host cursor.
    fn set_cursor_captured(&self, captured: bool);

    /// Registers `observer` for this window's events.
    fn install_observer(&self, observer: Weak<dyn EventObserver>);

    /// Unregisters an observer previously installed with `install_observer`.
    fn remove_observer(&self, observer: &Weak<dyn EventObserver>);
}
