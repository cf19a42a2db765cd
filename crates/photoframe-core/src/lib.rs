//! Photoframe Core - frame compositor library
//!
//! This crate provides the core of the campaign photo frame tool: interactive
//! crop/zoom/rotation state over a user photo, deterministic extraction of the
//! framed square, compositing under a transparent overlay, and export to PNG.
//!
//! # Pipeline
//!
//! 1. [`transform::resolve`] turns a [`CropState`] into a [`transform::SampleRegion`]
//! 2. [`transform::extract`] rotates, crops and scales the photo
//! 3. [`composite::compose`] draws photo then frame, optionally clipped to a circle
//! 4. [`encode::encode_png`] serializes the result
//! 5. [`export::ExportPipeline`] runs the above for an [`editor::Controller`] and saves the file

pub mod composite;
pub mod config;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod export;
pub mod mask;
pub mod transform;

pub use composite::compose;
pub use config::{CampaignConfig, EditorLimits};
pub use editor::{Controller, EditorPhase, SourceImage};
pub use export::{ExportError, ExportPipeline, ExportReceipt};
pub use transform::{extract, resolve, SampleRegion};

use serde::{Deserialize, Serialize};

/// Rotation angles are kept at millidegree resolution so that `θ` and
/// `θ + 360` normalize to the same value despite float rounding.
const ROTATION_RESOLUTION: f64 = 1000.0;

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    let snapped = (wrapped * ROTATION_RESOLUTION).round() / ROTATION_RESOLUTION;
    if snapped >= 360.0 {
        0.0
    } else {
        snapped
    }
}

/// Pan of the crop center away from the image center.
///
/// Each axis is normalized to `[-1, 1]`: `x = -1` puts the crop center on
/// the left image edge and `x = 1` on the right edge; `y` likewise for top
/// and bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }.clamped()
    }

    /// Clamp both axes into `[-1, 1]`; non-finite values reset to center.
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            x: clamp(self.x),
            y: clamp(self.y),
        }
    }
}

/// Crop, zoom and rotation over the current photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropState {
    /// Pan of the crop center.
    pub offset: PanOffset,
    /// Zoom factor; 1.0 frames the photo's short edge.
    pub zoom: f64,
    /// Clockwise rotation of the photo content, degrees in `[0, 360)`.
    pub rotation_degrees: f64,
}

impl Default for CropState {
    fn default() -> Self {
        Self {
            offset: PanOffset::default(),
            zoom: 1.0,
            rotation_degrees: 0.0,
        }
    }
}

impl CropState {
    /// Create a CropState at the editing defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Whether the composite is clipped to a circle or left square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskMode {
    #[default]
    Square,
    Circle,
}

impl MaskMode {
    pub fn toggled(self) -> Self {
        match self {
            MaskMode::Square => MaskMode::Circle,
            MaskMode::Circle => MaskMode::Square,
        }
    }
}
