//! Crop geometry and extraction of the framed square.
//!
//! # Coordinate System
//!
//! - Pixel coordinates of the photo in its natural (EXIF-corrected) size
//! - Origin is the top-left corner, y grows downward
//! - Rotation is about the photo center, positive = clockwise on screen,
//!   on a canvas that keeps the natural size (corners rotated out are lost,
//!   uncovered areas are transparent)
//!
//! # Stages
//!
//! 1. [`resolve`] maps a [`crate::CropState`] to a [`SampleRegion`]
//! 2. [`extract`] samples that region into a square raster

mod extract;
mod region;

pub use extract::{extract, ExtractError};
pub use region::{resolve, GeometryError, SampleRegion};
