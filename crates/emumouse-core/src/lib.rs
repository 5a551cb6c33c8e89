//! # emumouse-core
//!
//! Platform-independent building blocks for translating host pointer input
//! into the state of emulated mice.
//!
//! This crate has no dependency on any windowing toolkit.  The host crate
//! (`emumouse-host`) binds these pieces to a real (or mock) host window.
//!
//! # Architecture overview
//!
//! - **`domain`** – The data an emulated mouse exposes to the emulator: button
//!   bits, positions, accumulated wheel travel, the bounded per-device data
//!   list, and the capture ("pointer lock") state machine.  The
//!   [`DeviceStore`] keeps one lock per device so the host event thread never
//!   stalls on a device it is not writing to.
//!
//! - **`normalize`** – Converts host payloads (host button identifiers,
//!   window-local coordinates, wheel angle deltas) into canonical units.
//!
//! - **`handler`** – The [`MouseHandler`] trait the emulator's device registry
//!   polls, plus the [`NullMouseHandler`] backend that never connects a device.

pub mod domain;
pub mod handler;
pub mod normalize;

pub use domain::buttons::{ButtonMap, HostButton, MouseButton};
pub use domain::capture::{CaptureController, CaptureSettings, CaptureState};
pub use domain::device::{
    DeviceSnapshot, MouseData, MouseState, MouseUpdate, MOUSE_MAX_DATA_LIST_NUM,
};
pub use domain::events::{
    HostEvent, HostKey, MouseButtonEvent, MouseMoveEvent, WheelEvent, WindowId,
};
pub use domain::store::DeviceStore;
pub use handler::{
    DeviceStatus, HandlerError, HandlerKind, MouseHandler, MouseHandlerBase, MouseInfo,
    NullMouseHandler, MAX_MICE,
};
pub use normalize::{EventNormalizer, Motion, DEFAULT_WHEEL_NOTCH};
