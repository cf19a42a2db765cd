//! Frame overlay sources.
//!
//! The overlay is loaded once per export, so replacing the asset on disk
//! takes effect on the next export without restarting.

use std::sync::Arc;

use thiserror::Error;

use crate::decode::{decode_image_no_orientation, DecodeError, DecodedImage};

/// The frame overlay could not be obtained. Distinct from errors in the
/// user's own photo.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("Failed to read frame asset {asset}: {source}")]
    Read {
        asset: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode frame asset {asset}: {source}")]
    Decode {
        asset: String,
        #[source]
        source: DecodeError,
    },
}

/// Somewhere the frame overlay bytes come from.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Stable identifier used in logs and errors.
    fn id(&self) -> &str;

    async fn load_bytes(&self) -> Result<Vec<u8>, AssetLoadError>;
}

/// Load and decode the overlay. EXIF orientation is ignored for overlays.
pub async fn load_frame<F: FrameSource>(source: &F) -> Result<DecodedImage, AssetLoadError> {
    let bytes = source.load_bytes().await?;
    decode_image_no_orientation(&bytes).map_err(|source_err| AssetLoadError::Decode {
        asset: source.id().to_string(),
        source: source_err,
    })
}

/// Overlay read from a file on every load.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FrameFile {
    path: std::path::PathBuf,
    id: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameFile {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let id = path.display().to_string();
        Self { path, id }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameSource for FrameFile {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load_bytes(&self) -> Result<Vec<u8>, AssetLoadError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|source| AssetLoadError::Read {
                asset: self.id.clone(),
                source,
            })
    }
}

/// Overlay bytes held in memory (bundled into the page, or preloaded).
#[derive(Debug, Clone)]
pub struct EmbeddedFrame {
    id: String,
    bytes: Arc<[u8]>,
}

impl EmbeddedFrame {
    pub fn new(id: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: id.into(),
            bytes: bytes.into(),
        }
    }
}

impl FrameSource for EmbeddedFrame {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load_bytes(&self) -> Result<Vec<u8>, AssetLoadError> {
        Ok(self.bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;

    fn frame_png() -> Vec<u8> {
        let frame = DecodedImage::filled(6, 6, [255, 255, 255, 0]);
        encode_png(&frame.pixels, 6, 6).unwrap()
    }

    #[tokio::test]
    async fn test_embedded_frame_loads() {
        let source = EmbeddedFrame::new("frame.png", frame_png());
        let frame = load_frame(&source).await.unwrap();
        assert_eq!((frame.width, frame.height), (6, 6));
        assert_eq!(frame.pixel(0, 0)[3], 0);
    }

    #[tokio::test]
    async fn test_corrupt_frame_is_asset_error() {
        let source = EmbeddedFrame::new("broken.png", vec![0x89, b'P', b'N', b'G', 0, 0]);
        let result = load_frame(&source).await;
        assert!(matches!(
            result,
            Err(AssetLoadError::Decode { ref asset, .. }) if asset == "broken.png"
        ));
    }

    #[tokio::test]
    async fn test_frame_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        std::fs::write(&path, frame_png()).unwrap();

        let frame = load_frame(&FrameFile::new(&path)).await.unwrap();
        assert_eq!(frame.width, 6);
    }

    #[tokio::test]
    async fn test_missing_frame_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FrameFile::new(dir.path().join("absent.png"));
        let result = load_frame(&source).await;
        assert!(matches!(result, Err(AssetLoadError::Read { .. })));
    }
}
