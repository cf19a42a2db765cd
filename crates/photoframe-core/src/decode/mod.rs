//! Image decoding for the frame compositor.
//!
//! This module provides functionality for:
//! - Decoding user photos (JPEG, PNG, WebP) with EXIF orientation applied
//! - Decoding transparent frame overlays
//! - Resizing decoded rasters with a selectable filter
//!
//! Everything is held as straight-alpha RGBA so photos and overlays share
//! one pixel layout through extraction and compositing.

mod photo;
mod resize;
mod types;

pub use photo::{decode_image, decode_image_no_orientation};
pub use resize::resize;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
