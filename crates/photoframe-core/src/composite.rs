//! Layer compositing onto the square output surface.
//!
//! The surface starts fully transparent. Layers are stretched to the surface
//! size and blended source-over in straight alpha. An optional circle clip
//! scales each layer's alpha by the clip coverage as it is drawn, so both the
//! photo and the frame are clipped and the corners stay transparent.
//!
//! # Layer Order
//!
//! 1. Photo (the extracted square)
//! 2. Frame overlay (always on top)

use thiserror::Error;

use crate::decode::{resize, DecodeError, DecodedImage, FilterType};
use crate::mask::CircleClip;
use crate::MaskMode;

/// Errors from compositing.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Invalid photo layer: {0}")]
    Photo(#[source] DecodeError),

    #[error("Invalid frame layer: {0}")]
    Frame(#[source] DecodeError),

    #[error("Output size must be non-zero")]
    EmptyOutput,
}

/// A square RGBA drawing surface with an optional clip.
struct Surface {
    image: DecodedImage,
    clip: Option<CircleClip>,
}

impl Surface {
    fn new(size: u32, mask: MaskMode) -> Self {
        let clip = match mask {
            MaskMode::Square => None,
            MaskMode::Circle => Some(CircleClip::inscribed(size)),
        };
        Self {
            image: DecodedImage::transparent(size, size),
            clip,
        }
    }

    /// Stretch `layer` over the whole surface and blend it on top.
    fn draw_stretched(&mut self, layer: &DecodedImage, filter: FilterType) -> Result<(), DecodeError> {
        let size = self.image.width;
        let scaled = resize(layer, size, size, filter)?;

        for y in 0..size {
            for x in 0..size {
                let coverage = match &self.clip {
                    Some(clip) => clip.coverage(x, y),
                    None => 1.0,
                };
                if coverage <= 0.0 {
                    continue;
                }
                let idx = (y as usize * size as usize + x as usize) * DecodedImage::CHANNELS;
                let src = &scaled.pixels[idx..idx + 4];
                let dst = &mut self.image.pixels[idx..idx + 4];
                blend_over(src, dst, coverage);
            }
        }
        Ok(())
    }

    fn finish(self) -> DecodedImage {
        self.image
    }
}

/// Source-over in straight alpha, with the source alpha scaled by `coverage`.
///
/// A fully opaque, fully covered source replaces the destination exactly.
#[inline]
fn blend_over(src: &[u8], dst: &mut [u8], coverage: f32) {
    let sa = src[3] as f32 / 255.0 * coverage;
    if sa <= 0.0 {
        return;
    }
    if sa >= 1.0 {
        dst.copy_from_slice(src);
        return;
    }

    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    for c in 0..3 {
        let sc = src[c] as f32;
        let dc = dst[c] as f32;
        let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        dst[c] = out.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Composite the photo square under the frame overlay.
///
/// # Arguments
///
/// * `photo` - Extracted photo square (stretched if not `output_size`)
/// * `frame` - Frame overlay with transparency (stretched to `output_size`)
/// * `mask` - Whether to clip the result to the inscribed circle
/// * `output_size` - Side of the result, in pixels
/// * `filter` - Filter used to stretch layers
///
/// # Errors
///
/// Returns `ComposeError::EmptyOutput` for a zero size, or the layer whose
/// pixel buffer is inconsistent.
pub fn compose(
    photo: &DecodedImage,
    frame: &DecodedImage,
    mask: MaskMode,
    output_size: u32,
    filter: FilterType,
) -> Result<DecodedImage, ComposeError> {
    if output_size == 0 {
        return Err(ComposeError::EmptyOutput);
    }

    let mut surface = Surface::new(output_size, mask);
    surface
        .draw_stretched(photo, filter)
        .map_err(ComposeError::Photo)?;
    surface
        .draw_stretched(frame, filter)
        .map_err(ComposeError::Frame)?;

    Ok(surface.finish())
}
