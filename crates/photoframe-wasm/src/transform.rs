//! WASM bindings for crop geometry, extraction and compositing.
//!
//! These are the stateless building blocks behind [`crate::JsFrameEditor`],
//! exposed for pages that manage their own editing state.

use crate::types::{filter_from_u8, js_error, mask_from_bool, JsDecodedImage};
use photoframe_core::config::{ConfigError, EditorLimits};
use photoframe_core::transform::{self, SampleRegion};
use photoframe_core::{composite, CropState, PanOffset};
use wasm_bindgen::prelude::*;

fn crop_state(zoom: f64, rotation_degrees: f64, pan_x: f64, pan_y: f64) -> CropState {
    CropState {
        offset: PanOffset::new(pan_x, pan_y),
        zoom,
        rotation_degrees,
    }
}

/// Campaign limits from optional JSON; `None` means the defaults.
fn parse_limits(limits_json: Option<&str>) -> Result<EditorLimits, ConfigError> {
    match limits_json {
        Some(json) => EditorLimits::from_json_str(json),
        None => Ok(EditorLimits::default()),
    }
}

fn resolve_crop(
    width: u32,
    height: u32,
    crop: CropState,
    limits_json: Option<&str>,
) -> Result<SampleRegion, String> {
    let limits = parse_limits(limits_json).map_err(|e| e.to_string())?;
    transform::resolve(width, height, &crop, &limits).map_err(|e| e.to_string())
}

/// Resolve the source region framed by a crop.
///
/// `limits_json` is an optional `EditorLimits` object as JSON, the same
/// `limits` the editor's campaign config carries. Omitted fields and a
/// missing argument take the defaults.
///
/// # Returns
///
/// `{ origin_x, origin_y, width, height, rotation_degrees }` in source pixels.
///
/// # Example (TypeScript)
///
/// ```typescript
/// const region = resolve_region(2000, 1000, 1.0, 0, 0, 0, undefined);
/// // { origin_x: 500, origin_y: 0, width: 1000, height: 1000, rotation_degrees: 0 }
/// ```
#[wasm_bindgen]
pub fn resolve_region(
    width: u32,
    height: u32,
    zoom: f64,
    rotation_degrees: f64,
    pan_x: f64,
    pan_y: f64,
    limits_json: Option<String>,
) -> Result<JsValue, JsValue> {
    let crop = crop_state(zoom, rotation_degrees, pan_x, pan_y);
    let region = resolve_crop(width, height, crop, limits_json.as_deref()).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&region).map_err(js_error)
}

/// Rotate, crop and scale `image` to an `output_size` square, resolving
/// the crop under `limits_json` as [`resolve_region`] does.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn extract_square(
    image: &JsDecodedImage,
    zoom: f64,
    rotation_degrees: f64,
    pan_x: f64,
    pan_y: f64,
    output_size: u32,
    filter: u8,
    limits_json: Option<String>,
) -> Result<JsDecodedImage, JsValue> {
    let source = image.to_decoded();
    let crop = crop_state(zoom, rotation_degrees, pan_x, pan_y);
    let region = resolve_crop(source.width, source.height, crop, limits_json.as_deref())
        .map_err(js_error)?;

    transform::extract(&source, &region, output_size, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(js_error)
}

/// Draw `photo` then `frame` onto an `output_size` square, optionally
/// clipped to a circle.
#[wasm_bindgen]
pub fn compose_frame(
    photo: &JsDecodedImage,
    frame: &JsDecodedImage,
    circle: bool,
    output_size: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    composite::compose(
        &photo.to_decoded(),
        &frame.to_decoded(),
        mask_from_bool(circle),
        output_size,
        filter_from_u8(filter),
    )
    .map(JsDecodedImage::from_decoded)
    .map_err(js_error)
}
