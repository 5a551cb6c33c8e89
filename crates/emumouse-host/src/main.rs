//! emumouse: headless harness for the emulated mouse handler.
//!
//! Builds a [`BasicMouseHandler`] from the TOML config, binds it to a mock
//! host window, replays a scripted input session on a "dispatch" thread and
//! polls the emulated devices on a fixed tick, logging every update the
//! emulated software would see.
//!
//! # Usage
//!
//! ```text
//! emumouse [OPTIONS]
//!
//! Options:
//!   --config      <PATH>  Config file [default: platform config dir]
//!   --max-connect <N>     Number of emulated mice (1-127)
//!   --ticks       <N>     Number of poll ticks to run [default: 60]
//!   --tick-ms     <MS>    Poll period in milliseconds
//! ```
//!
//! Log output is controlled by `RUST_LOG`; when unset, the config's
//! `general.log_level` applies.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use emumouse_core::{
    HostButton, HostEvent, HostKey, MouseButtonEvent, MouseHandler, MouseMoveEvent, WheelEvent,
};
use emumouse_host::application::basic_handler::{BasicMouseHandler, HandlerOptions};
use emumouse_host::application::poll_devices::DevicePoller;
use emumouse_host::infrastructure::host_window::mock::MockHostWindow;
use emumouse_host::infrastructure::host_window::HostWindow;
use emumouse_host::infrastructure::storage::config::{self, AppConfig, ConfigError};

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "emumouse",
    about = "Replays host pointer input into emulated mice and prints what the emulator polls",
    version
)]
struct Cli {
    /// Path to the TOML config file.  Defaults to the platform config dir.
    #[arg(long, env = "EMUMOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Number of emulated mice; overrides `handler.max_connect`.
    #[arg(long, env = "EMUMOUSE_MAX_CONNECT")]
    max_connect: Option<u32>,

    /// Number of poll ticks before exiting.
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Poll period in milliseconds; overrides `poll.tick_ms`.
    #[arg(long)]
    tick_ms: Option<u64>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => match config::load_config() {
                Ok(cfg) => cfg,
                Err(ConfigError::NoPlatformConfigDir) => AppConfig::default(),
                Err(e) => return Err(e).context("loading platform config"),
            },
        };
        if let Some(max_connect) = self.max_connect {
            cfg.handler.max_connect = max_connect;
        }
        if let Some(tick_ms) = self.tick_ms {
            cfg.poll.tick_ms = tick_ms;
        }
        Ok(cfg)
    }
}

// ── Scripted host session ─────────────────────────────────────────────────────

/// A short session: click to capture, move around, scroll, drag, release.
fn scripted_session() -> Vec<HostEvent> {
    let (cx, cy) = ((WINDOW_WIDTH / 2) as i32, (WINDOW_HEIGHT / 2) as i32);
    let click = |button| MouseButtonEvent { button, x: cx, y: cy };
    vec![
        HostEvent::Motion(MouseMoveEvent { x: 100, y: 100 }),
        HostEvent::ButtonPress(click(HostButton::Left)),
        HostEvent::ButtonRelease(click(HostButton::Left)),
        HostEvent::Motion(MouseMoveEvent { x: cx + 12, y: cy - 4 }),
        HostEvent::Motion(MouseMoveEvent { x: cx, y: cy }),
        HostEvent::Motion(MouseMoveEvent { x: cx - 30, y: cy + 7 }),
        HostEvent::Wheel(WheelEvent { delta_x: 0, delta_y: 60 }),
        HostEvent::Wheel(WheelEvent { delta_x: 0, delta_y: 60 }),
        HostEvent::Wheel(WheelEvent { delta_x: 0, delta_y: -120 }),
        HostEvent::ButtonPress(click(HostButton::Right)),
        HostEvent::Motion(MouseMoveEvent { x: cx + 5, y: cy + 5 }),
        HostEvent::ButtonRelease(click(HostButton::Right)),
        HostEvent::ButtonPress(click(HostButton::Middle)),
        HostEvent::KeyPress(HostKey::Escape),
        HostEvent::Motion(MouseMoveEvent { x: 10, y: 10 }),
    ]
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = cli.load_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.general.log_level)),
        )
        .init();

    info!(
        max_connect = cfg.handler.max_connect,
        active_device = cfg.handler.active_device,
        "emumouse starting"
    );

    // ── Handler and window ────────────────────────────────────────────────────
    let handler = BasicMouseHandler::new(HandlerOptions::from_config(&cfg));
    handler
        .init(cfg.handler.max_connect)
        .context("initialising emulated mice")?;

    let window = Arc::new(MockHostWindow::new(1, WINDOW_WIDTH, WINDOW_HEIGHT));
    let host: Arc<dyn HostWindow> = window.clone();
    handler.set_target_window(Some(&host));

    // ── Host dispatch thread ──────────────────────────────────────────────────
    let tick = Duration::from_millis(cfg.poll.tick_ms);
    let dispatch_window = Arc::clone(&window);
    let dispatcher = thread::spawn(move || {
        for event in scripted_session() {
            let consumed = dispatch_window.dispatch(event);
            debug!(kind = event.kind(), consumed, "host event dispatched");
            thread::sleep(tick / 2);
        }
    });

    // ── Emulation poll loop ───────────────────────────────────────────────────
    let (tx, mut rx) = mpsc::channel(64);
    let poller = DevicePoller::new(handler.clone(), tick);
    let ticks = cli.ticks;
    let poll_task = tokio::spawn(async move { poller.run(Some(ticks), tx).await });

    while let Some(update) = rx.recv().await {
        info!(
            device = update.index,
            buttons = update.buttons,
            x = update.x,
            y = update.y,
            dx = update.delta_x,
            dy = update.delta_y,
            wheel = update.wheel,
            records = update.data.len(),
            "device update"
        );
    }

    let delivered = poll_task.await.context("poll task panicked")?;
    if dispatcher.join().is_err() {
        warn!("host dispatch thread panicked");
    }

    handler.set_target_window(None);
    info!(
        delivered,
        warps = window.warp_count(),
        locked = handler.get_mouse_lock_state(),
        "emumouse stopped"
    );
    Ok(())
}
