//! Application layer use cases for the mouse handler.
//!
//! Code here orchestrates the core state types against the abstractions in
//! `infrastructure`; it performs no window-system calls of its own.
//!
//! # Sub-modules
//!
//! - **`basic_handler`** – Binds to a host window, filters its events and
//!   writes them into the active emulated mouse.  Runs on the host's event
//!   dispatch thread, for every click, wheel step and pointer motion.
//!
//! - **`poll_devices`** – The emulation side: drains accumulated device state
//!   on a fixed tick, as the emulator's device registry does.

pub mod basic_handler;
pub mod poll_devices;
