//! TOML-based configuration for the mouse handler.
//!
//! Read from the platform-appropriate config file unless a path is given:
//! - Windows:  `%APPDATA%\emumouse\config.toml`
//! - Linux:    `~/.config/emumouse/config.toml`
//! - macOS:    `~/Library/Application Support/emumouse/config.toml`
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [handler]
//! max_connect = 1
//! active_device = 0
//!
//! [capture]
//! trigger_button = "Left"
//! release_key = "Escape"
//!
//! [buttons]
//! left = 1
//! right = 2
//! ```
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration.

use std::path::{Path, PathBuf};

use emumouse_core::{ButtonMap, CaptureSettings, DEFAULT_WHEEL_NOTCH};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub handler: HandlerConfig,
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default)]
    pub buttons: ButtonMap,
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Device layout and event handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerConfig {
    /// Number of addressable emulated mice (`1..=127`).
    #[serde(default = "default_max_connect")]
    pub max_connect: u32,
    /// Device that host input drives.
    #[serde(default)]
    pub active_device: u32,
    /// Raw wheel units per reported notch.
    #[serde(default = "default_wheel_notch")]
    pub wheel_notch: i32,
    /// Report handled pointer events as consumed so the host skips its own
    /// default handling.
    #[serde(default = "default_true")]
    pub consume_events: bool,
}

/// Emulation poll schedule used by the harness.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_connect() -> u32 {
    1
}
fn default_wheel_notch() -> i32 {
    DEFAULT_WHEEL_NOTCH
}
fn default_true() -> bool {
    true
}
fn default_tick_ms() -> u64 {
    16
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            max_connect: default_max_connect(),
            active_device: 0,
            wheel_notch: default_wheel_notch(),
            consume_events: default_true(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from the platform location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform location.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `emumouse` leaf.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("emumouse"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("emumouse"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("emumouse")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use emumouse_core::{HostButton, HostKey};
    use uuid::Uuid;

    #[test]
    fn test_default_config_drives_one_device() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.handler.max_connect, 1);
        assert_eq!(cfg.handler.active_device, 0);
        assert_eq!(cfg.handler.wheel_notch, 120);
        assert!(cfg.handler.consume_events);
        assert_eq!(cfg.general.log_level, "info");
        assert_eq!(cfg.poll.tick_ms, 16);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        // Arrange
        let toml_str = r#"
[handler]
max_connect = 4

[capture]
trigger_button = "Right"
release_key = { Function = 12 }

[buttons]
back = 0
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.handler.max_connect, 4);
        assert_eq!(cfg.handler.wheel_notch, 120);
        assert_eq!(cfg.capture.trigger_button, HostButton::Right);
        assert_eq!(cfg.capture.release_key, HostKey::Function(12));
        assert!(cfg.capture.release_on_focus_loss);
        assert_eq!(cfg.buttons.back, 0);
        assert_eq!(cfg.buttons.left, 1);
    }

    #[test]
    fn test_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.handler.max_connect = 7;
        cfg.capture.click_to_capture = false;
        cfg.capture.release_key = HostKey::Other(0x1000_0031);
        cfg.buttons.middle = 8;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let dir = std::env::temp_dir().join(format!("emumouse_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let result = load_config_from(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        let cfg = load_config_from(&path).expect("missing file is not an error");

        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip_via_temp_dir() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("emumouse_test_{}", Uuid::new_v4()));
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.general.log_level = "debug".to_string();
        cfg.poll.tick_ms = 4;

        // Act
        save_config_to(&cfg, &path).expect("save");
        let loaded = load_config_from(&path).expect("load");

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("emumouse/config.toml"), "got {path:?}");
        }
    }
}
