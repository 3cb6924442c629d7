//! Configuration management for roomview
//!
//! Provides loading, saving and validation of the timing contracts (debounce
//! settle window, auto-hide dwell times) and view defaults.

use crate::errors::RoomError;
use crate::room::ViewLayout;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Prefix for environment overrides, e.g. `ROOMVIEW__ADAPTATION__SETTLE_WINDOW_MS=250`.
pub const ENV_PREFIX: &str = "ROOMVIEW";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoomViewConfig {
    pub adaptation: AdaptationConfig,
    pub auto_hide: AutoHideConfig,
    pub view: ViewConfig,
}

/// Viewport-driven layer adaptation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Issue adaptation requests at all
    pub enabled: bool,
    /// Quiet period after the last resize before a size counts as changed
    pub settle_window_ms: u64,
}

/// Auto-hide dwell times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoHideConfig {
    /// Delay after the pointer leaves a region
    pub pointer_dwell_ms: u64,
    /// Delay after a touch ends
    pub touch_dwell_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_layout: ViewLayout,
    /// Keep the fullscreen exit button visible even when toolbars are hidden
    pub permanent_top_bar: bool,
    pub advanced_mode: bool,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_window_ms: 400,
        }
    }
}

impl Default for AutoHideConfig {
    fn default() -> Self {
        Self {
            pointer_dwell_ms: 10_000,
            touch_dwell_ms: 2_000,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_layout: ViewLayout::Democratic,
            permanent_top_bar: true,
            advanced_mode: false,
        }
    }
}

impl AdaptationConfig {
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }
}

impl AutoHideConfig {
    pub fn pointer_dwell(&self) -> Duration {
        Duration::from_millis(self.pointer_dwell_ms)
    }

    pub fn touch_dwell(&self) -> Duration {
        Duration::from_millis(self.touch_dwell_ms)
    }
}

impl RoomViewConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RoomError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: RoomViewConfig = toml::from_str(&contents)
            .map_err(|e| RoomError::Config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the TOML file (optional) with `ROOMVIEW__SECTION__KEY` environment overrides on top
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, RoomError> {
        let path = path.as_ref();

        let config: RoomViewConfig = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate().map_err(RoomError::Config)?;
        log::debug!("Layered configuration resolved from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RoomError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| RoomError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, toml_string)?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("roomview.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.adaptation.settle_window_ms == 0 || self.adaptation.settle_window_ms > 10_000 {
            return Err("Settle window must be between 1 and 10000 ms".to_string());
        }

        let dwell_range = 1..=600_000;
        if !dwell_range.contains(&self.auto_hide.pointer_dwell_ms) {
            return Err("Pointer dwell must be between 1 and 600000 ms".to_string());
        }
        if !dwell_range.contains(&self.auto_hide.touch_dwell_ms) {
            return Err("Touch dwell must be between 1 and 600000 ms".to_string());
        }
        if self.auto_hide.touch_dwell_ms > self.auto_hide.pointer_dwell_ms {
            return Err("Touch dwell must not exceed pointer dwell".to_string());
        }

        Ok(())
    }
}
