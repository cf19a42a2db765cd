//! Photoframe WASM - WebAssembly bindings for the frame editor
//!
//! This crate exposes photoframe-core to the campaign web page.
//!
//! # Module Structure
//!
//! - `editor` - `JsFrameEditor`, one editing session with preview and export
//! - `download` - Browser download as the export destination
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (photos and overlays, resize)
//! - `encode` - PNG encoding bindings
//! - `transform` - Stateless geometry, extraction and compositing
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsFrameEditor } from '@photoframe/wasm';
//!
//! await init();
//! const editor = new JsFrameEditor(frameBytes);
//! editor.select_image(photoBytes);
//! const preview = editor.preview();
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod download;
mod editor;
mod encode;
mod transform;
mod types;

// Re-export public types
pub use decode::{decode_frame, decode_image, resize};
pub use download::DownloadSink;
pub use editor::JsFrameEditor;
pub use encode::{encode_png, encode_png_from_image};
pub use transform::{compose_frame, extract_square, resolve_region};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
