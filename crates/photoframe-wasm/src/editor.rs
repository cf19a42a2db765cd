//! Editing session bindings.
//!
//! `JsFrameEditor` owns one controller and the campaign's frame overlay. The
//! page forwards input events to it, draws `preview()` after each change and
//! calls `export()` from the download button.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const frame = new Uint8Array(await (await fetch('atinwpsframe.png')).arrayBuffer());
//! const editor = new JsFrameEditor(frame);
//!
//! editor.select_image(new Uint8Array(await file.arrayBuffer()));
//! canvas.addEventListener('wheel', (e) => { editor.wheel(e.deltaY); redraw(); });
//!
//! const filename = await editor.export();
//! ```

use std::rc::Rc;

use photoframe_core::config::CampaignConfig;
use photoframe_core::decode::{decode_image_no_orientation, DecodedImage};
use photoframe_core::editor::{Controller, CropEvent, EditorError, EditorPhase, Point};
use photoframe_core::export::{lock, shared, EmbeddedFrame, ExportPipeline, SharedEditor};
use photoframe_core::{CropState, MaskMode};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::download::DownloadSink;
use crate::types::{js_error, mask_from_bool, JsDecodedImage};

/// Editing state as seen by the page.
#[derive(Debug, Clone, Serialize)]
struct EditorView {
    state: &'static str,
    crop: Option<CropState>,
    mask: Option<MaskMode>,
}

fn phase_name(phase: EditorPhase) -> &'static str {
    match phase {
        EditorPhase::Empty => "empty",
        EditorPhase::Editing => "editing",
        EditorPhase::Exporting => "exporting",
    }
}

/// A photo frame editing session.
#[wasm_bindgen]
pub struct JsFrameEditor {
    editor: SharedEditor,
    frame: Rc<DecodedImage>,
    pipeline: Rc<ExportPipeline<EmbeddedFrame, DownloadSink>>,
}

impl JsFrameEditor {
    fn build(frame_bytes: &[u8], config: CampaignConfig) -> Result<Self, String> {
        let frame_id = config.frame_path.display().to_string();
        let controller = Controller::new(config).map_err(|e| e.to_string())?;
        let frame = decode_image_no_orientation(frame_bytes).map_err(|e| e.to_string())?;

        Ok(Self {
            editor: shared(controller),
            frame: Rc::new(frame),
            pipeline: Rc::new(ExportPipeline::new(
                EmbeddedFrame::new(frame_id, frame_bytes.to_vec()),
                DownloadSink,
            )),
        })
    }

    fn apply(&self, event: CropEvent) -> Result<CropState, EditorError> {
        lock(&self.editor).apply(&event)
    }

    fn view(&self) -> EditorView {
        let controller = lock(&self.editor);
        EditorView {
            state: phase_name(controller.phase()),
            crop: controller.crop(),
            mask: controller.mask(),
        }
    }

    fn render_preview(&self) -> Result<DecodedImage, String> {
        lock(&self.editor)
            .render_preview(&self.frame)
            .map_err(|e| e.to_string())
    }
}

#[wasm_bindgen]
impl JsFrameEditor {
    /// Start a session with the frame overlay PNG and an optional JSON
    /// campaign config (missing fields take defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(frame_bytes: &[u8], config_json: Option<String>) -> Result<JsFrameEditor, JsValue> {
        let config = match config_json {
            Some(json) => CampaignConfig::from_json_str(&json).map_err(js_error)?,
            None => CampaignConfig::default(),
        };
        Self::build(frame_bytes, config).map_err(js_error)
    }

    /// Select a photo. On failure the current photo and edits are kept.
    pub fn select_image(&self, bytes: &[u8]) -> Result<(), JsValue> {
        lock(&self.editor).select_image(bytes).map_err(js_error)
    }

    pub fn remove_image(&self) {
        lock(&self.editor).remove_image();
    }

    /// Mouse wheel: negative `delta_y` zooms in.
    pub fn wheel(&self, delta_y: f64) -> Result<(), JsValue> {
        self.apply(CropEvent::Wheel { delta_y }).map(|_| ()).map_err(js_error)
    }

    pub fn pinch_start(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), JsValue> {
        lock(&self.editor)
            .pinch_start(Point::new(x1, y1), Point::new(x2, y2))
            .map_err(js_error)
    }

    /// Returns true when the move changed the zoom.
    pub fn pinch_move(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<bool, JsValue> {
        lock(&self.editor)
            .pinch_move(Point::new(x1, y1), Point::new(x2, y2))
            .map(|crop| crop.is_some())
            .map_err(js_error)
    }

    pub fn pinch_end(&self) {
        lock(&self.editor).pinch_end();
    }

    /// Pointer drag by `(dx, dy)` preview pixels.
    pub fn drag(&self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.apply(CropEvent::Drag { dx, dy }).map(|_| ()).map_err(js_error)
    }

    pub fn set_zoom(&self, zoom: f64) -> Result<(), JsValue> {
        self.apply(CropEvent::ZoomTo(zoom)).map(|_| ()).map_err(js_error)
    }

    pub fn set_rotation(&self, degrees: f64) -> Result<(), JsValue> {
        self.apply(CropEvent::RotateTo(degrees)).map(|_| ()).map_err(js_error)
    }

    pub fn rotate_by(&self, steps: i32) -> Result<(), JsValue> {
        self.apply(CropEvent::RotateBy { steps }).map(|_| ()).map_err(js_error)
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.apply(CropEvent::Reset).map(|_| ()).map_err(js_error)
    }

    pub fn set_circle(&self, circle: bool) -> Result<(), JsValue> {
        lock(&self.editor)
            .set_mask(mask_from_bool(circle))
            .map_err(js_error)
    }

    /// Returns true when the mask is now a circle.
    pub fn toggle_mask(&self) -> Result<bool, JsValue> {
        lock(&self.editor)
            .toggle_mask()
            .map(|mask| mask == MaskMode::Circle)
            .map_err(js_error)
    }

    /// Current zoom, 1.0 without a photo.
    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        lock(&self.editor).crop().map_or(1.0, |c| c.zoom)
    }

    /// Current rotation in degrees, 0 without a photo.
    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        lock(&self.editor).crop().map_or(0.0, |c| c.rotation_degrees)
    }

    #[wasm_bindgen(getter)]
    pub fn circle(&self) -> bool {
        lock(&self.editor).mask() == Some(MaskMode::Circle)
    }

    /// `"empty"`, `"editing"` or `"exporting"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        phase_name(lock(&self.editor).phase()).to_string()
    }

    /// The full editing state as a plain object.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.view()).map_err(js_error)
    }

    /// Render the live preview (RGBA, `preview_size` square).
    pub fn preview(&self) -> Result<JsDecodedImage, JsValue> {
        self.render_preview()
            .map(JsDecodedImage::from_decoded)
            .map_err(js_error)
    }

    /// Export and download the framed photo.
    ///
    /// Resolves to the downloaded filename; rejects with a message if the
    /// export failed or was cancelled by selecting or removing a photo.
    pub fn export(&self) -> js_sys::Promise {
        let editor = SharedEditor::clone(&self.editor);
        let pipeline = Rc::clone(&self.pipeline);
        future_to_promise(async move {
            pipeline
                .run(&editor)
                .await
                .map(|receipt| JsValue::from_str(&receipt.filename))
                .map_err(js_error)
        })
    }
}
