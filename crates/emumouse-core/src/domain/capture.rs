//! Pointer capture ("mouse lock") state machine.
//!
//! ```text
//!             trigger button / request_capture(true)
//!   UNLOCKED ───────────────────────────────────────▶ LOCKED
//!      ▲                                                 │
//!      └───── release key / focus loss / unbind ─────────┘
//! ```
//!
//! The controller only tracks state.  Host side effects (hiding and grabbing
//! the cursor) are performed by the caller when [`CaptureController::lock`]
//! or [`CaptureController::unlock`] report an actual transition.
//!
//! The state is a single `AtomicBool`: the poll thread can query it at any
//! time without contending with the host event thread.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::buttons::HostButton;
use super::events::HostKey;

/// The two capture states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Unlocked,
    Locked,
}

/// Which gestures engage and release capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Engage capture when the trigger button is pressed on the target window.
    /// When `false` only programmatic requests lock.
    #[serde(default = "default_true")]
    pub click_to_capture: bool,
    /// Button whose press engages capture.
    #[serde(default = "default_trigger_button")]
    pub trigger_button: HostButton,
    /// Key that releases capture.
    #[serde(default = "default_release_key")]
    pub release_key: HostKey,
    /// Release capture when the target window loses focus.
    #[serde(default = "default_true")]
    pub release_on_focus_loss: bool,
    /// Track the pointer (absolute, clamped) and buttons even while unlocked.
    #[serde(default)]
    pub forward_while_unlocked: bool,
}

fn default_trigger_button() -> HostButton {
    HostButton::Left
}
fn default_release_key() -> HostKey {
    HostKey::Escape
}
fn default_true() -> bool {
    true
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            click_to_capture: default_true(),
            trigger_button: default_trigger_button(),
            release_key: default_release_key(),
            release_on_focus_loss: default_true(),
            forward_while_unlocked: false,
        }
    }
}

/// Tracks whether pointer input is currently captured.
pub struct CaptureController {
    locked: AtomicBool,
    settings: CaptureSettings,
}

impl CaptureController {
    /// Creates an unlocked controller.
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            locked: AtomicBool::new(false),
            settings,
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Current state.  Side-effect free and never blocks.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    pub fn state(&self) -> CaptureState {
        if self.is_locked() {
            CaptureState::Locked
        } else {
            CaptureState::Unlocked
        }
    }

    /// UNLOCKED → LOCKED.  Returns `true` only if this call made the transition.
    pub fn lock(&self) -> bool {
        let changed = !self.locked.swap(true, Ordering::AcqRel);
        if changed {
            info!("pointer capture engaged");
        }
        changed
    }

    /// LOCKED → UNLOCKED.  Returns `true` only if this call made the transition.
    pub fn unlock(&self) -> bool {
        let changed = self.locked.swap(false, Ordering::AcqRel);
        if changed {
            info!("pointer capture released");
        }
        changed
    }

    pub fn is_trigger(&self, button: HostButton) -> bool {
        self.settings.click_to_capture && self.settings.trigger_button == button
    }

    pub fn is_release_key(&self, key: HostKey) -> bool {
        self.settings.release_key == key
    }

    /// Whether pointer input should reach device state right now.
    pub fn forwards_input(&self) -> bool {
        self.is_locked() || self.settings.forward_while_unlocked
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_unlocked() {
        let capture = CaptureController::new(CaptureSettings::default());
        assert_eq!(capture.state(), CaptureState::Unlocked);
        assert!(!capture.is_locked());
    }

    #[test]
    fn test_repeated_lock_is_idempotent() {
        // Arrange
        let capture = CaptureController::new(CaptureSettings::default());

        // Act
        let first = capture.lock();
        let second = capture.lock();

        // Assert
        assert!(first);
        assert!(!second, "second lock must not report a transition");
        assert_eq!(capture.state(), CaptureState::Locked);
    }

    #[test]
    fn test_repeated_unlock_is_idempotent() {
        let capture = CaptureController::new(CaptureSettings::default());
        capture.lock();

        assert!(capture.unlock());
        assert!(!capture.unlock());
        assert_eq!(capture.state(), CaptureState::Unlocked);
    }

    #[test]
    fn test_unlock_while_unlocked_reports_no_transition() {
        let capture = CaptureController::new(CaptureSettings::default());
        assert!(!capture.unlock());
    }

    #[test]
    fn test_default_gestures() {
        let capture = CaptureController::new(CaptureSettings::default());

        assert!(capture.is_trigger(HostButton::Left));
        assert!(!capture.is_trigger(HostButton::Right));
        assert!(capture.is_release_key(HostKey::Escape));
        assert!(!capture.is_release_key(HostKey::Pause));
    }

    #[test]
    fn test_disabled_trigger_matches_no_button() {
        let capture = CaptureController::new(CaptureSettings {
            click_to_capture: false,
            ..CaptureSettings::default()
        });
        assert!(!capture.is_trigger(HostButton::Left));
    }

    #[test]
    fn test_forwards_input_follows_lock_unless_configured() {
        // Arrange
        let gated = CaptureController::new(CaptureSettings::default());
        let open = CaptureController::new(CaptureSettings {
            forward_while_unlocked: true,
            ..CaptureSettings::default()
        });

        // Assert
        assert!(!gated.forwards_input());
        gated.lock();
        assert!(gated.forwards_input());
        assert!(open.forwards_input());
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: CaptureSettings = toml::from_str("release_key = \"Pause\"").unwrap();
        assert_eq!(settings.release_key, HostKey::Pause);
        assert_eq!(settings.trigger_button, HostButton::Left);
        assert!(settings.click_to_capture);
        assert!(settings.release_on_focus_loss);
    }
}
