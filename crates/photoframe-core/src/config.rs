//! Campaign configuration.
//!
//! Zoom and rotation bounds, output size and the frame asset are injected as
//! one immutable value so several frame campaigns can share the same core.
//! Every field has a default, so a config file only needs the fields it
//! overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Bounds and step sizes for the interactive editing controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorLimits {
    /// Maximum pull-back.
    pub min_zoom: f64,
    /// Maximum magnification.
    pub max_zoom: f64,
    /// Zoom change per wheel notch and per slider step.
    pub zoom_step: f64,
    /// Lower end of the rotation slider, in degrees.
    pub min_rotation: f64,
    /// Upper end of the rotation slider (exclusive), in degrees.
    pub max_rotation: f64,
    /// Rotation change per step, in degrees.
    pub rotation_step: f64,
    /// Change in finger distance (preview pixels) that a pinch must exceed
    /// before it affects zoom.
    pub pinch_threshold_px: f64,
    /// Zoom change per preview pixel of pinch distance change.
    pub pinch_zoom_per_px: f64,
}

impl Default for EditorLimits {
    fn default() -> Self {
        Self {
            min_zoom: 0.2,
            max_zoom: 2.0,
            zoom_step: 0.1,
            min_rotation: 0.0,
            max_rotation: 360.0,
            rotation_step: 1.0,
            pinch_threshold_px: 10.0,
            pinch_zoom_per_px: 0.005,
        }
    }
}

impl EditorLimits {
    /// Clamp a zoom value into `[min_zoom, max_zoom]`. NaN means 1.0.
    ///
    /// Never panics; with an unordered range the upper bound wins.
    #[inline]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        let zoom = if zoom.is_nan() { 1.0 } else { zoom };
        zoom.max(self.min_zoom).min(self.max_zoom)
    }

    /// Parse and validate a JSON document; missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let limits: Self = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..={} must be positive and ordered",
                self.min_zoom, self.max_zoom
            )));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&1.0) {
            return Err(ConfigError::Invalid(
                "zoom range must include 1.0, the reset zoom".to_string(),
            ));
        }
        if self.zoom_step <= 0.0 || self.rotation_step <= 0.0 {
            return Err(ConfigError::Invalid("step sizes must be positive".to_string()));
        }
        if self.min_rotation < 0.0 || self.max_rotation > 360.0 || self.min_rotation >= self.max_rotation
        {
            return Err(ConfigError::Invalid(format!(
                "rotation range {}..{} must lie within 0..360",
                self.min_rotation, self.max_rotation
            )));
        }
        if self.pinch_threshold_px < 0.0 || self.pinch_zoom_per_px <= 0.0 {
            return Err(ConfigError::Invalid(
                "pinch threshold must be non-negative and pinch rate positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// One frame campaign: its overlay, export naming and editing limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Prefix of exported file names: `<prefix>-<unix-millis>.png`.
    pub file_prefix: String,
    /// Path of the transparent PNG overlay.
    pub frame_path: PathBuf,
    /// Side of the square export, in pixels.
    pub output_size: u32,
    /// Side of the square live preview, in pixels. Pointer deltas are
    /// measured in this space.
    pub preview_size: u32,
    /// Filter used when scaling the crop and overlay to the output.
    pub filter: FilterType,
    pub limits: EditorLimits,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            file_prefix: "atinwps".to_string(),
            frame_path: PathBuf::from("atinwpsframe.png"),
            output_size: 1000,
            preview_size: 500,
            filter: FilterType::Lanczos3,
            limits: EditorLimits::default(),
        }
    }
}

impl CampaignConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_size == 0 || self.preview_size == 0 {
            return Err(ConfigError::Invalid(
                "output and preview sizes must be non-zero".to_string(),
            ));
        }
        if self.file_prefix.is_empty()
            || self
                .file_prefix
                .chars()
                .any(|c| matches!(c, '/' | '\\' | ':' | '\0'))
        {
            return Err(ConfigError::Invalid(format!(
                "file prefix {:?} is not a valid file name component",
                self.file_prefix
            )));
        }
        self.limits.validate()
    }
}
