//! Values passed across the JS boundary, plus the small conversions the
//! bindings share.

use photoframe_core::decode::{DecodedImage, FilterType};
use photoframe_core::MaskMode;
use wasm_bindgen::prelude::*;

/// An RGBA raster owned by WASM memory.
///
/// The layout matches `ImageData`, so a preview draws with
/// `new ImageData(new Uint8ClampedArray(img.pixels()), img.width, img.height)`.
/// `pixels()` copies into a fresh `Uint8Array` on every call.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Wrap row-major RGBA bytes, `width * height * 4` long.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel buffer length in bytes.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release the buffer now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// `0` nearest, `2` Lanczos3, anything else bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

pub(crate) fn mask_from_bool(circle: bool) -> MaskMode {
    if circle {
        MaskMode::Circle
    } else {
        MaskMode::Square
    }
}

/// Map any displayable error to a JS exception value.
pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
