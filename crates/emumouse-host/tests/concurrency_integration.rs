//! Concurrency tests: a host dispatch thread writing while the emulation
//! thread polls.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use emumouse_core::{
    HostButton, HostEvent, MouseButton, MouseButtonEvent, MouseHandler, MouseMoveEvent, WheelEvent,
};
use emumouse_host::application::basic_handler::{BasicMouseHandler, HandlerOptions};
use emumouse_host::application::poll_devices::DevicePoller;
use emumouse_host::infrastructure::host_window::mock::MockHostWindow;
use emumouse_host::infrastructure::host_window::HostWindow;
use tokio::sync::mpsc;

const MOTIONS: i32 = 2_000;

fn locked_handler(width: u32, height: u32) -> (Arc<BasicMouseHandler>, Arc<MockHostWindow>) {
    let handler = BasicMouseHandler::new(HandlerOptions::default());
    handler.init(2).unwrap();
    let window = Arc::new(MockHostWindow::new(1, width, height));
    let host: Arc<dyn HostWindow> = window.clone();
    handler.set_target_window(Some(&host));
    handler.request_capture(true);
    (handler, window)
}

#[test]
fn test_polling_during_motion_loses_no_delta() {
    // Arrange
    let (handler, window) = locked_handler(100, 100);
    let producer_window = Arc::clone(&window);

    // Act – every motion is one pixel right of the centre
    let producer = thread::spawn(move || {
        for _ in 0..MOTIONS {
            producer_window.dispatch(HostEvent::Motion(MouseMoveEvent { x: 51, y: 50 }));
        }
    });

    let mut total_dx = 0;
    while !producer.is_finished() {
        total_dx += handler.take_update(0).unwrap().delta_x;
        thread::yield_now();
    }
    producer.join().unwrap();
    total_dx += handler.take_update(0).unwrap().delta_x;

    // Assert
    assert_eq!(total_dx, MOTIONS);
    // One warp on lock, then one per motion.
    assert_eq!(window.warp_count(), MOTIONS as usize + 1);
}

#[test]
fn test_lock_state_reads_do_not_block_writers() {
    let (handler, window) = locked_handler(100, 100);
    let reader_handler = Arc::clone(&handler);

    let reader = thread::spawn(move || {
        let mut locked_reads = 0;
        for _ in 0..10_000 {
            if reader_handler.get_mouse_lock_state() {
                locked_reads += 1;
            }
        }
        locked_reads
    });
    for _ in 0..500 {
        window.dispatch(HostEvent::Wheel(WheelEvent { delta_x: 0, delta_y: 120 }));
    }

    assert_eq!(reader.join().unwrap(), 10_000);
    assert_eq!(handler.take_update(0).unwrap().wheel, 500);
}

#[tokio::test]
async fn test_poller_delivers_updates_while_host_dispatches() {
    // Arrange
    let (handler, window) = locked_handler(640, 480);
    let poller = DevicePoller::new(handler.clone(), Duration::from_millis(1));
    let (tx, mut rx) = mpsc::channel(256);

    // Act
    let producer_window = Arc::clone(&window);
    let producer = thread::spawn(move || {
        let event = MouseButtonEvent {
            button: HostButton::Right,
            x: 320,
            y: 240,
        };
        producer_window.dispatch(HostEvent::ButtonPress(event));
        for step in 1..=50 {
            producer_window.dispatch(HostEvent::Motion(MouseMoveEvent { x: 320 + step % 3, y: 240 }));
        }
        producer_window.dispatch(HostEvent::ButtonRelease(event));
    });
    producer.join().unwrap();
    let delivered = poller.run(Some(5), tx).await;

    // Assert
    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }
    assert_eq!(delivered as usize, updates.len());
    assert!(!updates.is_empty());
    let total_dx: i32 = updates.iter().map(|u| u.delta_x).sum();
    let expected_dx: i32 = (1..=50).map(|step| step % 3).sum();
    assert_eq!(total_dx, expected_dx);
    let last = updates.last().unwrap();
    assert!(last.buttons & MouseButton::Button2.bit() == 0, "right button released");
    assert!(updates.iter().all(|u| u.index == 0));
}
