//! DevicePoller: the consumer side of the device store.
//!
//! The emulator's device registry samples each mouse once per emulation tick
//! and hands the result to emulated software.  `DevicePoller` plays that role
//! for the headless harness and the tests: it drains every connected device
//! through [`MouseHandler::take_update`] and forwards whatever changed.

use std::sync::Arc;
use std::time::Duration;

use emumouse_core::{MouseHandler, MouseUpdate};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

/// Periodically drains accumulated state from a [`MouseHandler`].
pub struct DevicePoller {
    handler: Arc<dyn MouseHandler>,
    tick: Duration,
}

impl DevicePoller {
    /// `tick` is clamped to at least one millisecond.
    pub fn new(handler: Arc<dyn MouseHandler>, tick: Duration) -> Self {
        Self {
            handler,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Drains every connected device once.
    ///
    /// Devices with nothing new since the previous poll are left out, so an
    /// idle handler yields an empty vector.
    pub fn poll_once(&self) -> Vec<MouseUpdate> {
        (0..self.handler.device_count())
            .filter_map(|index| self.handler.take_update(index))
            .filter(|update| update.connected && !update.is_idle())
            .collect()
    }

    /// Polls every tick and sends each non-idle update into `sink`.
    ///
    /// Runs for `ticks` ticks, or until `sink` is closed when `ticks` is
    /// `None`.  Returns the number of updates delivered.
    pub async fn run(&self, ticks: Option<u64>, sink: mpsc::Sender<MouseUpdate>) -> u64 {
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut delivered = 0u64;
        let mut elapsed = 0u64;
        while ticks.map_or(true, |limit| elapsed < limit) {
            ticker.tick().await;
            elapsed += 1;

            for update in self.poll_once() {
                trace!(device = update.index, records = update.data.len(), "device update");
                if sink.send(update).await.is_err() {
                    debug!(delivered, "update sink closed, stopping poller");
                    return delivered;
                }
                delivered += 1;
            }
        }
        debug!(delivered, ticks = elapsed, "poller finished");
        delivered
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use emumouse_core::{MouseButton, NullMouseHandler};
    use std::time::Instant;

    use crate::application::basic_handler::{BasicMouseHandler, HandlerOptions};

    fn active_handler(max_connect: u32) -> Arc<BasicMouseHandler> {
        let handler = BasicMouseHandler::new(HandlerOptions::default());
        handler.init(max_connect).unwrap();
        handler
    }

    fn press_button1(handler: &BasicMouseHandler) {
        handler
            .base()
            .store()
            .apply(0, |state| state.set_button(MouseButton::Button1, true, Instant::now()));
    }

    #[test]
    fn test_tick_is_at_least_one_millisecond() {
        let poller = DevicePoller::new(Arc::new(NullMouseHandler::new()), Duration::ZERO);
        assert_eq!(poller.tick(), Duration::from_millis(1));
    }

    #[test]
    fn test_poll_once_skips_idle_and_disconnected_devices() {
        // Arrange
        let null: Arc<dyn MouseHandler> = Arc::new(NullMouseHandler::new());
        null.init(3).unwrap();
        let poller = DevicePoller::new(null, Duration::from_millis(5));

        // Act / Assert
        assert!(poller.poll_once().is_empty());
    }

    #[test]
    fn test_poll_once_drains_pending_state() {
        // Arrange
        let handler = active_handler(2);
        press_button1(&handler);
        let poller = DevicePoller::new(handler.clone(), Duration::from_millis(5));

        // Act
        let first = poller.poll_once();
        let second = poller.poll_once();

        // Assert
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].index, 0);
        assert_eq!(first[0].buttons, MouseButton::Button1.bit());
        assert!(second.is_empty(), "a drained device reports nothing new");
    }

    #[tokio::test]
    async fn test_run_stops_after_requested_ticks() {
        // Arrange
        let handler = active_handler(1);
        press_button1(&handler);
        let poller = DevicePoller::new(handler, Duration::from_millis(1));
        let (tx, mut rx) = mpsc::channel(8);

        // Act
        let delivered = poller.run(Some(3), tx).await;

        // Assert
        assert_eq!(delivered, 1);
        let update = rx.recv().await.expect("one update");
        assert_eq!(update.buttons, 1);
        assert!(rx.recv().await.is_none(), "sender dropped when run returns");
    }

    #[tokio::test]
    async fn test_run_stops_when_sink_closes() {
        let handler = active_handler(1);
        press_button1(&handler);
        let poller = DevicePoller::new(handler, Duration::from_millis(1));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let delivered = poller.run(None, tx).await;

        assert_eq!(delivered, 0);
    }
}
