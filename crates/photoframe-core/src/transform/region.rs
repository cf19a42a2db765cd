//! Sample region resolution.
//!
//! Maps the editing state onto the square of source pixels that the output
//! shows. The photo is first rotated about its own center on a canvas of its
//! natural size; the region is expressed in that rotated canvas.
//!
//! # Zoom
//!
//! The region side is `min(width, height) / zoom`: 1.0 frames the short
//! edge, 2.0 halves it, values below 1.0 pull back past the short edge.
//!
//! # Clamping
//!
//! The crop center follows the pan offset, then the region is shifted (never
//! shrunk) to stay inside the canvas. On an axis the region is too large to
//! fit, it is centered instead and the extractor pads with transparency.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EditorLimits;
use crate::{normalize_rotation, CropState};

/// Tolerance for float comparisons against canvas edges, relative to the
/// canvas dimension.
const EDGE_EPSILON: f64 = 1e-9;

/// Errors from sample region resolution and use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Source image has no pixels ({width}x{height})")]
    EmptySource { width: u32, height: u32 },

    #[error("Output size must be non-zero")]
    EmptyOutput,

    #[error("Zoom {0} does not give a finite positive region")]
    InvalidZoom(f64),

    #[error("Sample region {region:?} is not anchored in the {width}x{height} source")]
    OutOfBounds {
        region: SampleRegion,
        width: u32,
        height: u32,
    },
}

/// A square of the rotated source canvas, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRegion {
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation applied to the source before sampling, `[0, 360)`.
    pub rotation_degrees: f64,
}

impl SampleRegion {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Whether the region lies entirely inside `[0, width) x [0, height)`.
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        axis_within(self.origin_x, self.width, width as f64)
            && axis_within(self.origin_y, self.height, height as f64)
    }

    /// Whether each axis either lies inside the canvas or spans it
    /// symmetrically. Every resolved region satisfies this; the extractor
    /// refuses anything else.
    pub fn is_anchored(&self, width: u32, height: u32) -> bool {
        let finite = [self.origin_x, self.origin_y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.width > 0.0
            && self.height > 0.0
            && axis_anchored(self.origin_x, self.width, width as f64)
            && axis_anchored(self.origin_y, self.height, height as f64)
    }
}

fn axis_within(origin: f64, size: f64, dim: f64) -> bool {
    let eps = EDGE_EPSILON * dim.max(1.0);
    origin >= -eps && origin + size <= dim + eps
}

fn axis_anchored(origin: f64, size: f64, dim: f64) -> bool {
    if axis_within(origin, size, dim) {
        return true;
    }
    let eps = EDGE_EPSILON * dim.max(1.0);
    size >= dim && ((2.0 * origin + size) - dim).abs() <= eps
}

/// Position one axis of the region.
fn place_axis(dim: f64, side: f64, offset: f64) -> f64 {
    if side >= dim {
        return (dim - side) / 2.0;
    }
    let center = dim / 2.0 * (1.0 + offset);
    (center - side / 2.0).clamp(0.0, dim - side)
}

/// Resolve the editing state into the region of source pixels to sample.
///
/// Zoom is clamped to `limits`, the pan offset to `[-1, 1]` and the rotation
/// normalized to `[0, 360)`, so any `CropState` resolves.
///
/// # Errors
///
/// Returns `GeometryError::EmptySource` if either dimension is zero and
/// `GeometryError::InvalidZoom` if `limits` admit a zoom that is not finite
/// and positive (only possible with limits that fail validation).
pub fn resolve(
    natural_width: u32,
    natural_height: u32,
    crop: &CropState,
    limits: &EditorLimits,
) -> Result<SampleRegion, GeometryError> {
    if natural_width == 0 || natural_height == 0 {
        return Err(GeometryError::EmptySource {
            width: natural_width,
            height: natural_height,
        });
    }

    let w = natural_width as f64;
    let h = natural_height as f64;
    let zoom = limits.clamp_zoom(crop.zoom);
    if !(zoom.is_finite() && zoom > 0.0) {
        return Err(GeometryError::InvalidZoom(zoom));
    }
    let offset = crop.offset.clamped();

    let side = w.min(h) / zoom;

    Ok(SampleRegion {
        origin_x: place_axis(w, side, offset.x),
        origin_y: place_axis(h, side, offset.y),
        width: side,
        height: side,
        rotation_degrees: normalize_rotation(crop.rotation_degrees),
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::PanOffset;
    use proptest::prelude::*;

    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=4000, 1u32..=4000)
    }

    fn offset_strategy() -> impl Strategy<Value = PanOffset> {
        (-1.0f64..=1.0, -1.0f64..=1.0).prop_map(|(x, y)| PanOffset { x, y })
    }

    /// Whole millidegrees, so `θ + 360` is exactly representable.
    fn rotation_strategy() -> impl Strategy<Value = f64> {
        (-720_000i32..720_000).prop_map(|m| m as f64 / 1000.0)
    }

    proptest! {
        /// Property: for fixed pan and rotation, more zoom means a strictly smaller region.
        #[test]
        fn prop_zoom_monotonic(
            (width, height) in dimensions_strategy(),
            offset in offset_strategy(),
            rotation in rotation_strategy(),
            (z1, z2) in (0.2f64..=2.0, 0.2f64..=2.0),
        ) {
            prop_assume!((z1 - z2).abs() > 1e-9);
            let limits = EditorLimits::default();
            let (lo, hi) = if z1 < z2 { (z1, z2) } else { (z2, z1) };

            let wide = resolve(width, height, &CropState { offset, zoom: lo, rotation_degrees: rotation }, &limits).unwrap();
            let tight = resolve(width, height, &CropState { offset, zoom: hi, rotation_degrees: rotation }, &limits).unwrap();

            prop_assert!(tight.area() < wide.area());
        }

        /// Property: a full turn resolves to the same region.
        #[test]
        fn prop_rotation_periodic(
            (width, height) in dimensions_strategy(),
            offset in offset_strategy(),
            zoom in 0.2f64..=2.0,
            rotation in rotation_strategy(),
        ) {
            let limits = EditorLimits::default();
            let a = resolve(width, height, &CropState { offset, zoom, rotation_degrees: rotation }, &limits).unwrap();
            let b = resolve(width, height, &CropState { offset, zoom, rotation_degrees: rotation + 360.0 }, &limits).unwrap();

            prop_assert_eq!(a, b);
        }

        /// Property: whenever the region fits, it lies inside the source.
        #[test]
        fn prop_region_within_bounds(
            (width, height) in dimensions_strategy(),
            offset in offset_strategy(),
            zoom in 1.0f64..=2.0,
            rotation in rotation_strategy(),
        ) {
            let region = resolve(width, height, &CropState { offset, zoom, rotation_degrees: rotation }, &EditorLimits::default()).unwrap();

            prop_assert!(region.origin_x >= 0.0);
            prop_assert!(region.origin_y >= 0.0);
            prop_assert!(region.is_within(width, height), "region {:?} escapes {}x{}", region, width, height);
        }

        /// Property: every resolved region is accepted by the extractor.
        #[test]
        fn prop_region_always_anchored(
            (width, height) in dimensions_strategy(),
            (x, y) in (-3.0f64..=3.0, -3.0f64..=3.0),
            zoom in 0.0f64..=5.0,
            rotation in rotation_strategy(),
        ) {
            let crop = CropState { offset: PanOffset { x, y }, zoom, rotation_degrees: rotation };
            let region = resolve(width, height, &crop, &EditorLimits::default()).unwrap();

            prop_assert!(region.is_anchored(width, height));
            prop_assert!((0.0..360.0).contains(&region.rotation_degrees));
        }

        /// Property: the region is always square.
        #[test]
        fn prop_region_square(
            (width, height) in dimensions_strategy(),
            offset in offset_strategy(),
            zoom in 0.2f64..=2.0,
        ) {
            let region = resolve(width, height, &CropState { offset, zoom, rotation_degrees: 0.0 }, &EditorLimits::default()).unwrap();
            prop_assert_eq!(region.width, region.height);
        }
    }
}
