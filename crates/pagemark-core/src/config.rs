//! Editor configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides.

use crate::viewport::{FitPadding, MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_FACTOR, ZOOM_STEP};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub wheel_zoom_factor: f64,
    pub zoom_step: f64,
    pub fit_padding: FitPadding,
    /// Minimum spacing between consecutive ink points, in page units.
    pub decimation_threshold: f64,
    /// Smallest width/height a resize may produce, in page units.
    pub min_resize: f64,
    /// Screen-pixel radius for grabbing handles and anchors.
    pub handle_hit_radius: f64,
    /// Screen-pixel tolerance for clicking on shapes.
    pub hit_tolerance: f64,
    pub double_click_ms: u64,
    pub double_click_distance: f64,
    pub autosave_quiet_ms: u64,
    /// Raster scale for the interactive page background.
    pub live_render_scale: f64,
    /// Raster scale for exported pages.
    pub export_render_scale: f64,
    pub export_jpeg_quality: u8,
    /// Maximum retained history snapshots; `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            wheel_zoom_factor: WHEEL_ZOOM_FACTOR,
            zoom_step: ZOOM_STEP,
            fit_padding: FitPadding::default(),
            decimation_threshold: 4.0,
            min_resize: 5.0,
            handle_hit_radius: 10.0,
            hit_tolerance: 6.0,
            double_click_ms: 400,
            double_click_distance: 5.0,
            autosave_quiet_ms: 2000,
            live_render_scale: 3.0,
            export_render_scale: 2.0,
            export_jpeg_quality: 85,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.wheel_zoom_factor <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "wheel_zoom_factor {} must exceed 1",
                self.wheel_zoom_factor
            )));
        }
        if self.export_render_scale <= 0.0 || self.live_render_scale <= 0.0 {
            return Err(ConfigError::Invalid("render scales must be positive".into()));
        }
        if !(1..=100).contains(&self.export_jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "export_jpeg_quality {}",
                self.export_jpeg_quality
            )));
        }
        Ok(())
    }

    pub fn autosave_quiet_period(&self) -> Duration {
        Duration::from_millis(self.autosave_quiet_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}
