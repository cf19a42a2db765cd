//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding the composited RGBA surface to PNG

mod png;

pub use png::{encode_png, encode_png_image, EncodeError};
