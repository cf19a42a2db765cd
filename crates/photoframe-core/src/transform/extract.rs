//! Raster extraction of a sample region.
//!
//! Produces the square photo layer: the source rotated about its center,
//! cropped to the region and scaled to the output size.
//!
//! # Algorithm
//!
//! Extraction uses inverse mapping. An intermediate square raster of about
//! the region's own resolution is filled by mapping each pixel center back
//! through the rotation into the source:
//!
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + cy
//! ```
//!
//! where `(dx, dy)` is the point relative to the canvas center `(cx, cy)`.
//! Samples are bilinear on premultiplied alpha. Points outside the source
//! canvas are transparent. The intermediate raster is then resized to the
//! output size with the requested filter.

use thiserror::Error;

use super::region::{GeometryError, SampleRegion};
use crate::decode::{resize, DecodeError, DecodedImage, FilterType};

/// Errors from extracting a region of a photo.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid source image: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Cosine and sine of a clockwise rotation, exact at quarter turns so that
/// 90/180/270 degree rotations copy pixels without interpolation.
fn rotation_basis(degrees: f64) -> (f64, f64) {
    if degrees == 0.0 {
        (1.0, 0.0)
    } else if degrees == 90.0 {
        (0.0, 1.0)
    } else if degrees == 180.0 {
        (-1.0, 0.0)
    } else if degrees == 270.0 {
        (0.0, -1.0)
    } else {
        let rad = degrees.to_radians();
        (rad.cos(), rad.sin())
    }
}

/// Side of the intermediate raster. Follows the region's resolution, capped
/// at twice the output so large pull-backs stay bounded.
fn intermediate_side(region_side: f64, output_size: u32) -> u32 {
    let cap = output_size.saturating_mul(2).max(1) as f64;
    region_side.ceil().clamp(1.0, cap) as u32
}

/// Extract `region` from `source` as an `output_size` square.
///
/// # Arguments
///
/// * `source` - Decoded photo in its natural orientation
/// * `region` - Region from [`super::resolve`] for the same dimensions
/// * `output_size` - Side of the returned square, in pixels
/// * `filter` - Filter for the final scale to `output_size`
///
/// # Errors
///
/// - `ExtractError::Decode` if the source buffer is inconsistent
/// - `GeometryError::EmptyOutput` for a zero output size
/// - `GeometryError::OutOfBounds` if the region is not anchored in the source
pub fn extract(
    source: &DecodedImage,
    region: &SampleRegion,
    output_size: u32,
    filter: FilterType,
) -> Result<DecodedImage, ExtractError> {
    source.validate()?;
    if output_size == 0 {
        return Err(GeometryError::EmptyOutput.into());
    }
    if !region.is_anchored(source.width, source.height) {
        return Err(GeometryError::OutOfBounds {
            region: *region,
            width: source.width,
            height: source.height,
        }
        .into());
    }

    let side = intermediate_side(region.width, output_size);
    let step_x = region.width / side as f64;
    let step_y = region.height / side as f64;

    let (cos, sin) = rotation_basis(region.rotation_degrees);
    let cx = source.width as f64 / 2.0;
    let cy = source.height as f64 / 2.0;

    let mut pixels = Vec::with_capacity(side as usize * side as usize * DecodedImage::CHANNELS);

    for j in 0..side {
        let qy = region.origin_y + (j as f64 + 0.5) * step_y;
        let dy = qy - cy;
        for i in 0..side {
            let qx = region.origin_x + (i as f64 + 0.5) * step_x;
            let dx = qx - cx;

            let src_x = dx * cos + dy * sin + cx;
            let src_y = -dx * sin + dy * cos + cy;

            pixels.extend_from_slice(&sample_bilinear(source, src_x, src_y));
        }
    }

    let intermediate = DecodedImage::new(side, side, pixels);
    Ok(resize(&intermediate, output_size, output_size, filter)?)
}

/// Sample the source at canvas point `(x, y)`.
///
/// Pixel `(i, j)` covers `[i, i + 1) x [j, j + 1)` with its center at
/// `(i + 0.5, j + 0.5)`. Points inside the canvas but within half a pixel of
/// its edge take the edge pixel; points outside it are transparent.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (image.width as f64, image.height as f64);
    if !(x >= 0.0 && x <= w && y >= 0.0 && y <= h) {
        return [0, 0, 0, 0];
    }

    let px = (x - 0.5).clamp(0.0, w - 1.0);
    let py = (y - 0.5).clamp(0.0, h - 1.0);

    let x0 = px.floor() as u32;
    let y0 = py.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);

    let fx = px - x0 as f64;
    let fy = py - y0 as f64;

    let taps = [
        (image.pixel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (image.pixel(x1, y0), fx * (1.0 - fy)),
        (image.pixel(x0, y1), (1.0 - fx) * fy),
        (image.pixel(x1, y1), fx * fy),
    ];

    // Interpolate premultiplied so transparent texels don't bleed colour
    let mut premul = [0.0f64; 3];
    let mut alpha = 0.0f64;
    for (texel, weight) in taps {
        if weight == 0.0 {
            continue;
        }
        let a = texel[3] as f64 * weight;
        alpha += a;
        for c in 0..3 {
            premul[c] += texel[c] as f64 * a;
        }
    }

    if alpha <= 0.0 {
        return [0, 0, 0, 0];
    }

    [
        (premul[0] / alpha).round().clamp(0.0, 255.0) as u8,
        (premul[1] / alpha).round().clamp(0.0, 255.0) as u8,
        (premul[2] / alpha).round().clamp(0.0, 255.0) as u8,
        alpha.round().clamp(0.0, 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorLimits;
    use crate::transform::resolve;
    use crate::{CropState, PanOffset};

    /// Each pixel encodes its own coordinates.
    fn coordinate_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 77, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn region(origin_x: f64, origin_y: f64, side: f64, rotation: f64) -> SampleRegion {
        SampleRegion {
            origin_x,
            origin_y,
            width: side,
            height: side,
            rotation_degrees: rotation,
        }
    }

    #[test]
    fn test_unrotated_integer_region_is_exact_copy() {
        let source = coordinate_image(20, 10);
        let out = extract(&source, &region(5.0, 2.0, 6.0, 0.0), 6, FilterType::Lanczos3).unwrap();

        assert_eq!(out.width, 6);
        assert_eq!(out.height, 6);
        for y in 0..6 {
            for x in 0..6 {
                assert_eq!(out.pixel(x, y), source.pixel(x + 5, y + 2));
            }
        }
    }

    #[test]
    fn test_half_turn_flips_both_axes() {
        let source = coordinate_image(8, 8);
        let out = extract(&source, &region(0.0, 0.0, 8.0, 180.0), 8, FilterType::Nearest).unwrap();

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.pixel(x, y), source.pixel(7 - x, 7 - y));
            }
        }
    }

    #[test]
    fn test_quarter_turn_is_clockwise() {
        let source = coordinate_image(8, 8);
        let out = extract(&source, &region(0.0, 0.0, 8.0, 90.0), 8, FilterType::Nearest).unwrap();

        // Top-left of the source ends up top-right
        assert_eq!(out.pixel(7, 0), source.pixel(0, 0));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(out.pixel(x, y), source.pixel(y, 7 - x));
            }
        }
    }

    #[test]
    fn test_odd_rotation_leaves_transparent_corners() {
        let source = DecodedImage::filled(40, 40, [200, 100, 50, 255]);
        let out = extract(&source, &region(0.0, 0.0, 40.0, 45.0), 40, FilterType::Bilinear).unwrap();

        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(39, 39)[3], 0);
        assert_eq!(out.pixel(20, 20), [200, 100, 50, 255]);
    }

    #[test]
    fn test_pull_back_pads_with_transparency() {
        let source = DecodedImage::filled(10, 10, [9, 9, 9, 255]);
        let crop = CropState {
            offset: PanOffset::default(),
            zoom: 0.5,
            rotation_degrees: 0.0,
        };
        let r = resolve(10, 10, &crop, &EditorLimits::default()).unwrap();
        let out = extract(&source, &r, 20, FilterType::Nearest).unwrap();

        // Photo occupies the middle half
        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(19, 19)[3], 0);
        assert_eq!(out.pixel(10, 10), [9, 9, 9, 255]);
    }

    #[test]
    fn test_resolved_landscape_region_is_centered_square() {
        // Left and right thirds red, middle green
        let mut source = DecodedImage::filled(30, 10, [255, 0, 0, 255]);
        for y in 0..10u32 {
            for x in 10..20u32 {
                let idx = ((y * 30 + x) * 4) as usize;
                source.pixels[idx..idx + 4].copy_from_slice(&[0, 255, 0, 255]);
            }
        }
        let r = resolve(30, 10, &CropState::default(), &EditorLimits::default()).unwrap();
        let out = extract(&source, &r, 10, FilterType::Lanczos3).unwrap();

        assert!(out.pixels.chunks(4).all(|p| p == [0, 255, 0, 255]));
    }

    #[test]
    fn test_transparent_texels_do_not_bleed() {
        // Opaque white next to transparent red: interpolating must not tint
        let mut source = DecodedImage::filled(2, 1, [255, 255, 255, 255]);
        source.pixels[4..8].copy_from_slice(&[255, 0, 0, 0]);

        let sample = sample_bilinear(&source, 1.0, 0.5);
        assert_eq!(&sample[..3], &[255, 255, 255]);
        assert!(sample[3] > 100 && sample[3] < 150);
    }

    #[test]
    fn test_output_is_scaled() {
        let source = DecodedImage::filled(64, 48, [1, 2, 3, 255]);
        let r = resolve(64, 48, &CropState::default(), &EditorLimits::default()).unwrap();
        let out = extract(&source, &r, 100, FilterType::Bilinear).unwrap();
        assert_eq!((out.width, out.height), (100, 100));
    }

    #[test]
    fn test_intermediate_side_capped() {
        assert_eq!(intermediate_side(4000.0, 1000), 2000);
        assert_eq!(intermediate_side(333.3, 1000), 334);
        assert_eq!(intermediate_side(0.2, 1000), 1);
    }

    #[test]
    fn test_rejects_unanchored_region() {
        let source = DecodedImage::filled(10, 10, [0, 0, 0, 255]);
        let result = extract(&source, &region(8.0, 0.0, 5.0, 0.0), 5, FilterType::Nearest);
        assert!(matches!(
            result,
            Err(ExtractError::Geometry(GeometryError::OutOfBounds { .. }))
        ));
    }

    #[test]
    fn test_rejects_zero_output() {
        let source = DecodedImage::filled(10, 10, [0, 0, 0, 255]);
        let result = extract(&source, &region(0.0, 0.0, 10.0, 0.0), 0, FilterType::Nearest);
        assert!(matches!(
            result,
            Err(ExtractError::Geometry(GeometryError::EmptyOutput))
        ));
    }

    #[test]
    fn test_rejects_inconsistent_buffer() {
        let source = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![0; 12],
        };
        let result = extract(&source, &region(0.0, 0.0, 10.0, 0.0), 10, FilterType::Nearest);
        assert!(matches!(result, Err(ExtractError::Decode(_))));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
