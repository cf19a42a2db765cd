//! Circular clip for the composite surface.
//!
//! The clip is evaluated per pixel in surface pixel coordinates. Coverage is
//! 1.0 inside the circle, 0.0 outside, with a narrow feathered rim so the
//! exported edge is antialiased.

use super::smootherstep;
use serde::{Deserialize, Serialize};

/// Width of the antialiased rim, in pixels.
pub const DEFAULT_FEATHER_PX: f32 = 1.0;

/// A circle inscribed in a square surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleClip {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    /// Width of the rim inside `radius` over which coverage falls to zero.
    pub feather: f32,
}

impl CircleClip {
    /// The largest circle that fits a `size x size` surface.
    pub fn inscribed(size: u32) -> Self {
        let half = size as f32 / 2.0;
        Self {
            center_x: half,
            center_y: half,
            radius: half,
            feather: DEFAULT_FEATHER_PX,
        }
    }

    /// Coverage of the pixel at `(x, y)`, sampled at its center.
    ///
    /// Returns a value from 0.0 (clipped) to 1.0 (fully kept).
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        let dx = x as f32 + 0.5 - self.center_x;
        let dy = y as f32 + 0.5 - self.center_y;
        let dist = (dx * dx + dy * dy).sqrt();

        let feather = self.feather.max(0.0);
        let inner = self.radius - feather;

        if dist >= self.radius {
            0.0
        } else if dist <= inner {
            1.0
        } else {
            let t = (dist - inner) / feather.max(f32::EPSILON);
            1.0 - smootherstep(t)
        }
    }

    /// Check if a pixel center lies inside the circle boundary (ignoring feather).
    pub fn contains(&self, x: u32, y: u32) -> bool {
        let dx = x as f32 + 0.5 - self.center_x;
        let dy = y as f32 + 0.5 - self.center_y;
        dx * dx + dy * dy < self.radius * self.radius
    }
}
