//! The registry-facing side of a mouse backend.
//!
//! The emulator's device registry owns one [`MouseHandler`] and polls it on its
//! own schedule.  Backends differ only in where input comes from; the state
//! they expose lives in a shared [`MouseHandlerBase`].

use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use tracing::info;

use crate::domain::device::{DeviceSnapshot, MouseUpdate};
use crate::domain::store::DeviceStore;

/// Upper bound on addressable emulated mice.
pub const MAX_MICE: u32 = 127;

/// Vendor and product id reported for every emulated mouse.
const EMULATED_VENDOR_ID: u16 = 0x1234;
const EMULATED_PRODUCT_ID: u16 = 0x1234;

/// Error type for handler configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// `max_connect` was zero or above [`MAX_MICE`].  Not recoverable by the
    /// handler; the caller must abort initialization.
    #[error("invalid max_connect {requested}: must be between 1 and {max}")]
    InvalidMaxConnect { requested: u32, max: u32 },
}

/// Which backend a handler is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Exposes devices but never connects any.
    Null,
    /// Driven by events from a host window.
    Basic,
}

/// Connection status of one device slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Disconnected,
    Connected,
}

/// Summary the registry reads after `init`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MouseInfo {
    pub max_connect: u32,
    pub now_connect: u32,
    pub info_field: u32,
    pub vendor_id: Vec<u16>,
    pub product_id: Vec<u16>,
    pub status: Vec<DeviceStatus>,
}

/// Rejects a device count outside `1..=MAX_MICE`.
pub fn validate_max_connect(max_connect: u32) -> Result<(), HandlerError> {
    if max_connect == 0 || max_connect > MAX_MICE {
        return Err(HandlerError::InvalidMaxConnect {
            requested: max_connect,
            max: MAX_MICE,
        });
    }
    Ok(())
}

/// State shared by every backend: the device store plus the registry summary.
pub struct MouseHandlerBase {
    store: DeviceStore,
    info: RwLock<MouseInfo>,
}

impl MouseHandlerBase {
    pub fn new(wheel_notch: i32) -> Self {
        Self {
            store: DeviceStore::new(wheel_notch),
            info: RwLock::new(MouseInfo::default()),
        }
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    pub fn info(&self) -> MouseInfo {
        self.info.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// (Re)creates `max_connect` device slots and marks `connected` ones live.
    ///
    /// Indices in `connected` outside `0..max_connect` are skipped.  Calling
    /// this again discards every previous device and summary.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidMaxConnect`] if `max_connect` is zero or
    /// above [`MAX_MICE`]; the previous configuration is left untouched.
    pub fn init_devices(&self, max_connect: u32, connected: &[u32]) -> Result<(), HandlerError> {
        validate_max_connect(max_connect)?;

        self.store.reset(max_connect);
        let mut status = vec![DeviceStatus::Disconnected; max_connect as usize];
        for &index in connected {
            if self.store.set_connected(index, true) {
                status[index as usize] = DeviceStatus::Connected;
            }
        }
        let now_connect = status
            .iter()
            .filter(|s| **s == DeviceStatus::Connected)
            .count() as u32;

        *self.info.write().unwrap_or_else(PoisonError::into_inner) = MouseInfo {
            max_connect,
            now_connect,
            info_field: 0,
            vendor_id: vec![EMULATED_VENDOR_ID; max_connect as usize],
            product_id: vec![EMULATED_PRODUCT_ID; max_connect as usize],
            status,
        };
        info!(max_connect, now_connect, "mouse devices initialised");
        Ok(())
    }
}

/// A mouse backend as seen by the emulator's device registry.
///
/// Only [`init`](MouseHandler::init), [`kind`](MouseHandler::kind) and
/// [`base`](MouseHandler::base) are backend-specific; the polling surface is
/// provided on top of the shared base.
pub trait MouseHandler: Send + Sync {
    fn kind(&self) -> HandlerKind;

    /// Establishes the number of addressable devices.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidMaxConnect`] for a count outside
    /// `1..=MAX_MICE`.  Callers treat this as fatal.
    fn init(&self, max_connect: u32) -> Result<(), HandlerError>;

    fn base(&self) -> &MouseHandlerBase;

    fn info(&self) -> MouseInfo {
        self.base().info()
    }

    fn device_count(&self) -> u32 {
        self.base().store().len()
    }

    /// Non-destructive read of device `index`.
    fn snapshot(&self, index: u32) -> Option<DeviceSnapshot> {
        self.base().store().snapshot(index)
    }

    /// Consumes what device `index` accumulated since the previous poll.
    fn take_update(&self, index: u32) -> Option<MouseUpdate> {
        self.base().store().take_update(index)
    }
}

/// Backend with addressable but permanently disconnected devices.
pub struct NullMouseHandler {
    base: MouseHandlerBase,
}

impl NullMouseHandler {
    pub fn new() -> Self {
        Self {
            base: MouseHandlerBase::new(crate::normalize::DEFAULT_WHEEL_NOTCH),
        }
    }
}

impl Default for NullMouseHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseHandler for NullMouseHandler {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Null
    }

    fn init(&self, max_connect: u32) -> Result<(), HandlerError> {
        self.base.init_devices(max_connect, &[])
    }

    fn base(&self) -> &MouseHandlerBase {
        &self.base
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_zero() {
        assert_eq!(
            validate_max_connect(0),
            Err(HandlerError::InvalidMaxConnect { requested: 0, max: MAX_MICE })
        );
    }

    #[test]
    fn test_validate_rejects_above_platform_maximum() {
        assert!(validate_max_connect(MAX_MICE + 1).is_err());
        assert!(validate_max_connect(MAX_MICE).is_ok());
        assert!(validate_max_connect(1).is_ok());
    }

    #[test]
    fn test_init_devices_marks_requested_devices_connected() {
        // Arrange
        let base = MouseHandlerBase::new(120);

        // Act
        base.init_devices(4, &[0, 2, 9]).unwrap();

        // Assert
        let info = base.info();
        assert_eq!(info.max_connect, 4);
        assert_eq!(info.now_connect, 2);
        assert_eq!(
            info.status,
            vec![
                DeviceStatus::Connected,
                DeviceStatus::Disconnected,
                DeviceStatus::Connected,
                DeviceStatus::Disconnected,
            ]
        );
        assert_eq!(info.vendor_id, vec![0x1234; 4]);
        assert!(base.store().is_connected(2));
    }

    #[test]
    fn test_failed_init_keeps_previous_configuration() {
        let base = MouseHandlerBase::new(120);
        base.init_devices(2, &[0]).unwrap();

        let result = base.init_devices(0, &[0]);

        assert!(result.is_err());
        assert_eq!(base.info().max_connect, 2);
        assert_eq!(base.store().len(), 2);
    }

    #[test]
    fn test_reinit_reconfigures_instead_of_accumulating() {
        let base = MouseHandlerBase::new(120);
        base.init_devices(8, &[0]).unwrap();

        base.init_devices(3, &[1]).unwrap();

        let info = base.info();
        assert_eq!(info.max_connect, 3);
        assert_eq!(info.status.len(), 3);
        assert_eq!(info.now_connect, 1);
        assert!(!base.store().is_connected(0));
    }

    #[test]
    fn test_null_handler_exposes_only_disconnected_devices() {
        // Arrange
        let handler = NullMouseHandler::new();

        // Act
        handler.init(2).unwrap();

        // Assert
        assert_eq!(handler.kind(), HandlerKind::Null);
        assert_eq!(handler.device_count(), 2);
        assert_eq!(handler.info().now_connect, 0);
        let snap = handler.snapshot(1).unwrap();
        assert!(!snap.connected);
        assert!(handler.take_update(1).unwrap().is_idle());
        assert!(handler.snapshot(2).is_none());
    }

    #[test]
    fn test_null_handler_rejects_invalid_count() {
        let handler = NullMouseHandler::new();
        assert!(handler.init(MAX_MICE + 1).is_err());
        assert_eq!(handler.device_count(), 0);
    }
}
