// File: crates/chart-core/src/config.rs
// Summary: Tunables for axes, cache and the stack manager; loadable from JSON.
// Notes:
// - Every struct is `#[serde(default)]`, so a config file only lists what it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Period;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeAxisConfig {
    /// Bar body width in pixels.
    pub bar_size: f64,
    /// Gap between bars in pixels.
    pub bar_spacing: f64,
    pub scroll_speed: f64,
    /// Largest pan per gesture, as a fraction of visible bars.
    pub max_scroll_speed: f64,
    pub zoom_speed: f64,
    /// Right-hand gutter kept free of bars, in pixels.
    pub gutter_width: f64,
    /// Height of the time axis strip at the bottom of the surface.
    pub height: f64,
}

impl Default for TimeAxisConfig {
    fn default() -> Self {
        Self {
            bar_size: 3.0,
            bar_spacing: 1.0,
            scroll_speed: 0.001,
            max_scroll_speed: 0.5,
            zoom_speed: 0.001,
            gutter_width: 60.0,
            height: 20.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueAxisConfig {
    /// Vertical padding in pixels kept clear above and below the data.
    pub padding: f64,
    /// Minimum pixels between two value ticks.
    pub tick_spacing: f64,
    pub label_size: f32,
}

impl Default for ValueAxisConfig {
    fn default() -> Self {
        Self { padding: 20.0, tick_spacing: 20.0, label_size: 11.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Times a failed range is re-requested before it is given up on.
    pub max_retries: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub initial_period: Period,
    /// Smallest height a stack can be dragged down to.
    pub min_stack_height: f64,
    /// Theme preset name, see [`crate::theme::find`].
    pub theme: String,
    pub time_axis: TimeAxisConfig,
    pub value_axis: ValueAxisConfig,
    pub cache: CacheConfig,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            initial_period: 3600,
            min_stack_height: 40.0,
            theme: "dark".into(),
            time_axis: TimeAxisConfig::default(),
            value_axis: ValueAxisConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ManagerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_json(&text)?;
        log::info!("loaded config from {}", path.as_ref().display());
        Ok(cfg)
    }
}
