//! Domain entities for emulated mice.
//!
//! Nothing in here talks to a window system.  Host events arrive already
//! decoded into [`events::HostEvent`]; everything the emulator reads back is a
//! [`device::DeviceSnapshot`] or a drained [`device::MouseUpdate`].

pub mod buttons;
pub mod capture;
pub mod device;
pub mod events;
pub mod store;
