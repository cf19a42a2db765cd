//! Export pipeline: the edit in the controller to a saved PNG.
//!
//! # Stages
//!
//! 1. Resolve the sample region
//! 2. Extract the photo square at the output size
//! 3. Load the frame overlay (async)
//! 4. Composite photo, then frame
//! 5. Encode PNG
//! 6. Save `<prefix>-<unix-millis>.png` (async)
//!
//! The controller lock is taken only between stages, never across an await.
//! Before saving, the pipeline checks that the image was not replaced or
//! removed meanwhile; if it was, nothing is saved and the export is aborted.

mod frame;
mod sink;

#[cfg(not(target_arch = "wasm32"))]
pub use frame::FrameFile;
pub use frame::{load_frame, AssetLoadError, EmbeddedFrame, FrameSource};
#[cfg(not(target_arch = "wasm32"))]
pub use sink::DirectorySink;
pub use sink::{check_filename, ExportSink, MemorySink, SavedExport, SinkError};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::composite::{compose, ComposeError};
use crate::config::EditorLimits;
use crate::decode::{DecodeError, DecodedImage, FilterType};
use crate::editor::{Controller, EditSnapshot, EditorError, ExportTicket};
use crate::encode::{encode_png_image, EncodeError};
use crate::transform::{extract, resolve, ExtractError, GeometryError};

/// Controller handle shared between the UI and the export pipeline.
pub type SharedEditor = Arc<Mutex<Controller>>;

pub fn shared(controller: Controller) -> SharedEditor {
    Arc::new(Mutex::new(controller))
}

/// Lock the controller. A panic while holding the lock leaves the state
/// valid, so poisoning is ignored.
pub fn lock(editor: &SharedEditor) -> MutexGuard<'_, Controller> {
    editor.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Errors that end an export. Nothing is saved when one is returned.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No image selected")]
    NoImage,

    #[error("An export is already in progress")]
    InProgress,

    #[error("Export aborted: the image was replaced or removed")]
    Aborted,

    #[error("Could not read the photo: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    AssetLoad(#[from] AssetLoadError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to save {filename}: {source}")]
    Save {
        filename: String,
        #[source]
        source: SinkError,
    },
}

impl From<EditorError> for ExportError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::NoImage => ExportError::NoImage,
            EditorError::ExportInFlight => ExportError::InProgress,
            EditorError::Decode(e) => ExportError::Decode(e),
        }
    }
}

impl From<ExtractError> for ExportError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Decode(e) => ExportError::Decode(e),
            ExtractError::Geometry(e) => ExportError::Geometry(e),
        }
    }
}

fn compose_error(err: ComposeError, frame_id: &str) -> ExportError {
    match err {
        ComposeError::Photo(e) => ExportError::Decode(e),
        ComposeError::Frame(source) => ExportError::AssetLoad(AssetLoadError::Decode {
            asset: frame_id.to_string(),
            source,
        }),
        ComposeError::EmptyOutput => ExportError::Geometry(GeometryError::EmptyOutput),
    }
}

/// Confirmation of a saved export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub filename: String,
    pub location: String,
    pub byte_len: usize,
}

/// `<prefix>-<unix-millis>.png`
pub fn export_filename(prefix: &str, unix_millis: i64) -> String {
    format!("{prefix}-{unix_millis}.png")
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Resolve and extract the photo square for a snapshot.
pub fn render_photo(
    snapshot: &EditSnapshot,
    limits: &EditorLimits,
    size: u32,
    filter: FilterType,
) -> Result<DecodedImage, ExportError> {
    let source = snapshot.source.image();
    let region = resolve(source.width, source.height, &snapshot.crop, limits)?;
    debug_assert!(
        region.is_anchored(source.width, source.height),
        "resolver produced unanchored region {region:?}"
    );
    Ok(extract(source, &region, size, filter)?)
}

/// Render a snapshot under an already decoded frame, without encoding.
pub fn render(
    snapshot: &EditSnapshot,
    frame: &DecodedImage,
    limits: &EditorLimits,
    size: u32,
    filter: FilterType,
) -> Result<DecodedImage, ExportError> {
    let photo = render_photo(snapshot, limits, size, filter)?;
    compose(&photo, frame, snapshot.mask, size, filter).map_err(|e| compose_error(e, "frame"))
}

/// Releases the export lock when dropped, including when the export future
/// itself is dropped before completing.
struct ExportGuard<'a> {
    editor: &'a SharedEditor,
    ticket: ExportTicket,
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        if !lock(self.editor).finish_export(&self.ticket) {
            debug!(generation = self.ticket.generation(), "Stale export released");
        }
    }
}

/// Runs exports for a controller against a frame source and a sink.
pub struct ExportPipeline<F, S> {
    frame: F,
    sink: S,
    clock: fn() -> i64,
}

impl<F: FrameSource, S: ExportSink> ExportPipeline<F, S> {
    pub fn new(frame: F, sink: S) -> Self {
        Self::with_clock(frame, sink, now_millis)
    }

    /// Use `clock` (unix millis) for filenames.
    pub fn with_clock(frame: F, sink: S, clock: fn() -> i64) -> Self {
        Self { frame, sink, clock }
    }

    pub fn frame(&self) -> &F {
        &self.frame
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Export the controller's current edit.
    ///
    /// The controller is in `Exporting` for the duration and back in
    /// `Editing` (or `Empty`, if the image was removed) afterwards, whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// - `NoImage` / `InProgress` if the export could not start
    /// - `Aborted` if the image was replaced or removed before saving
    /// - `AssetLoad` if the frame overlay is missing or corrupt
    /// - `Encode` / `Save` if producing or writing the file failed
    pub async fn run(&self, editor: &SharedEditor) -> Result<ExportReceipt, ExportError> {
        let guard = ExportGuard {
            editor,
            ticket: lock(editor).begin_export()?,
        };
        info!(
            generation = guard.ticket.generation(),
            frame = self.frame.id(),
            "Export started"
        );

        let result = self.run_stages(editor, &guard.ticket).await;
        drop(guard);

        match &result {
            Ok(receipt) => info!(
                filename = %receipt.filename,
                location = %receipt.location,
                bytes = receipt.byte_len,
                "Export saved"
            ),
            Err(e) => warn!(error = %e, "Export failed"),
        }
        result
    }

    async fn run_stages(
        &self,
        editor: &SharedEditor,
        ticket: &ExportTicket,
    ) -> Result<ExportReceipt, ExportError> {
        let config = ticket.config();
        let snapshot = ticket.snapshot();

        let photo = render_photo(snapshot, &config.limits, config.output_size, config.filter)?;
        let frame = load_frame(&self.frame).await?;
        let composite = compose(&photo, &frame, snapshot.mask, config.output_size, config.filter)
            .map_err(|e| compose_error(e, self.frame.id()))?;
        let bytes = encode_png_image(&composite)?;

        if !lock(editor).is_current(ticket) {
            return Err(ExportError::Aborted);
        }

        let filename = export_filename(&config.file_prefix, (self.clock)());
        let saved = self
            .sink
            .save(&filename, &bytes)
            .await
            .map_err(|source| ExportError::Save {
                filename: filename.clone(),
                source,
            })?;

        Ok(ExportReceipt {
            filename,
            location: saved.location,
            byte_len: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CampaignConfig;
    use crate::decode::decode_image;
    use crate::editor::{CropEvent, EditorPhase, SourceImage};
    use crate::encode::encode_png;
    use crate::MaskMode;

    const FIXED_MILLIS: i64 = 1_700_000_000_000;

    fn fixed_clock() -> i64 {
        FIXED_MILLIS
    }

    fn small_config() -> CampaignConfig {
        CampaignConfig {
            output_size: 48,
            preview_size: 24,
            ..CampaignConfig::default()
        }
    }

    fn gradient_photo(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 3) as u8, (y * 5) as u8, 99, 255]);
            }
        }
        SourceImage::from_decoded(DecodedImage::new(width, height, pixels)).unwrap()
    }

    /// Transparent overlay with an opaque top band.
    fn frame_png(size: u32) -> Vec<u8> {
        let mut frame = DecodedImage::transparent(size, size);
        for y in 0..size / 4 {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                frame.pixels[idx..idx + 4].copy_from_slice(&[0, 80, 160, 255]);
            }
        }
        encode_png(&frame.pixels, size, size).unwrap()
    }

    fn editor_with_photo(width: u32, height: u32) -> SharedEditor {
        let mut controller = Controller::new(small_config()).unwrap();
        controller.select_source(gradient_photo(width, height));
        shared(controller)
    }

    fn pipeline() -> ExportPipeline<EmbeddedFrame, MemorySink> {
        ExportPipeline::with_clock(
            EmbeddedFrame::new("frame.png", frame_png(32)),
            MemorySink::new(),
            fixed_clock,
        )
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("atinwps", 1234), "atinwps-1234.png");
    }

    #[tokio::test]
    async fn test_export_saves_png() {
        let editor = editor_with_photo(80, 60);
        let pipeline = pipeline();

        let receipt = pipeline.run(&editor).await.unwrap();

        assert_eq!(receipt.filename, "atinwps-1700000000000.png");
        assert_eq!(receipt.location, "memory:atinwps-1700000000000.png");
        let saved = pipeline.sink().saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1.len(), receipt.byte_len);

        let decoded = decode_image(&saved[0].1).unwrap();
        assert_eq!((decoded.width, decoded.height), (48, 48));
        // Frame band on top, photo below
        assert_eq!(decoded.pixel(24, 2), [0, 80, 160, 255]);
        assert_eq!(decoded.pixel(24, 40)[3], 255);

        assert_eq!(lock(&editor).phase(), EditorPhase::Editing);
    }

    #[tokio::test]
    async fn test_repeated_exports_are_identical() {
        let editor = editor_with_photo(90, 70);
        lock(&editor).apply(&CropEvent::RotateTo(17.0)).unwrap();
        lock(&editor).apply(&CropEvent::ZoomTo(1.4)).unwrap();
        lock(&editor).set_mask(MaskMode::Circle).unwrap();
        let pipeline = pipeline();

        pipeline.run(&editor).await.unwrap();
        pipeline.run(&editor).await.unwrap();

        let saved = pipeline.sink().saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].1, saved[1].1);
    }

    #[tokio::test]
    async fn test_circle_export_has_transparent_corners() {
        let editor = editor_with_photo(64, 64);
        lock(&editor).set_mask(MaskMode::Circle).unwrap();
        let pipeline = pipeline();

        pipeline.run(&editor).await.unwrap();

        let decoded = decode_image(&pipeline.sink().saved()[0].1).unwrap();
        assert_eq!(decoded.pixel(0, 0)[3], 0);
        assert_eq!(decoded.pixel(47, 47)[3], 0);
        assert_eq!(decoded.pixel(24, 24)[3], 255);
    }

    #[tokio::test]
    async fn test_without_image() {
        let editor = shared(Controller::new(small_config()).unwrap());
        let result = pipeline().run(&editor).await;
        assert!(matches!(result, Err(ExportError::NoImage)));
    }

    #[tokio::test]
    async fn test_corrupt_frame_fails_and_recovers() {
        let editor = editor_with_photo(40, 40);
        lock(&editor).apply(&CropEvent::ZoomTo(1.3)).unwrap();
        let pipeline = ExportPipeline::with_clock(
            EmbeddedFrame::new("frame.png", b"not a png".to_vec()),
            MemorySink::new(),
            fixed_clock,
        );

        let result = pipeline.run(&editor).await;

        assert!(matches!(result, Err(ExportError::AssetLoad(_))));
        assert!(pipeline.sink().is_empty());
        let controller = lock(&editor);
        assert_eq!(controller.phase(), EditorPhase::Editing);
        assert_eq!(controller.crop().unwrap().zoom, 1.3);
    }

    #[tokio::test]
    async fn test_retry_after_failure_succeeds() {
        let editor = editor_with_photo(40, 40);
        let broken = ExportPipeline::with_clock(
            EmbeddedFrame::new("frame.png", Vec::new()),
            MemorySink::new(),
            fixed_clock,
        );
        assert!(broken.run(&editor).await.is_err());

        let working = pipeline();
        assert!(working.run(&editor).await.is_ok());
        assert_eq!(working.sink().len(), 1);
    }

    /// Frame source that runs a callback against the editor mid-export.
    struct Interfering<A: Fn(&SharedEditor)> {
        editor: SharedEditor,
        action: A,
        inner: EmbeddedFrame,
    }

    impl<A: Fn(&SharedEditor)> FrameSource for Interfering<A> {
        fn id(&self) -> &str {
            self.inner.id()
        }

        async fn load_bytes(&self) -> Result<Vec<u8>, AssetLoadError> {
            (self.action)(&self.editor);
            self.inner.load_bytes().await
        }
    }

    fn interfering<A: Fn(&SharedEditor)>(
        editor: &SharedEditor,
        action: A,
    ) -> ExportPipeline<Interfering<A>, MemorySink> {
        ExportPipeline::with_clock(
            Interfering {
                editor: Arc::clone(editor),
                action,
                inner: EmbeddedFrame::new("frame.png", frame_png(16)),
            },
            MemorySink::new(),
            fixed_clock,
        )
    }

    #[tokio::test]
    async fn test_removing_image_mid_export_aborts() {
        let editor = editor_with_photo(40, 40);
        let pipeline = interfering(&editor, |e| lock(e).remove_image());

        let result = pipeline.run(&editor).await;

        assert!(matches!(result, Err(ExportError::Aborted)));
        assert!(pipeline.sink().is_empty());
        assert_eq!(lock(&editor).phase(), EditorPhase::Empty);
    }

    #[tokio::test]
    async fn test_replacing_image_mid_export_aborts() {
        let editor = editor_with_photo(40, 40);
        let pipeline = interfering(&editor, |e| lock(e).select_source(gradient_photo(10, 10)));

        let result = pipeline.run(&editor).await;

        assert!(matches!(result, Err(ExportError::Aborted)));
        assert!(pipeline.sink().is_empty());
        let controller = lock(&editor);
        assert_eq!(controller.phase(), EditorPhase::Editing);
        assert_eq!(controller.source().unwrap().natural_width(), 10);
    }

    #[tokio::test]
    async fn test_gestures_rejected_while_exporting() {
        let editor = editor_with_photo(40, 40);
        let pipeline = interfering(&editor, |e| {
            let mut controller = lock(e);
            assert_eq!(controller.phase(), EditorPhase::Exporting);
            assert!(matches!(
                controller.apply(&CropEvent::ZoomTo(2.0)),
                Err(EditorError::ExportInFlight)
            ));
            assert!(matches!(controller.toggle_mask(), Err(EditorError::ExportInFlight)));
        });

        pipeline.run(&editor).await.unwrap();

        let controller = lock(&editor);
        assert_eq!(controller.crop().unwrap().zoom, 1.0);
        assert_eq!(controller.mask(), Some(MaskMode::Square));
    }

    /// Frame source that yields once so a concurrent export can start.
    struct Yielding(EmbeddedFrame);

    impl FrameSource for Yielding {
        fn id(&self) -> &str {
            self.0.id()
        }

        async fn load_bytes(&self) -> Result<Vec<u8>, AssetLoadError> {
            tokio::task::yield_now().await;
            self.0.load_bytes().await
        }
    }

    #[tokio::test]
    async fn test_concurrent_export_rejected() {
        let editor = editor_with_photo(40, 40);
        let pipeline = ExportPipeline::with_clock(
            Yielding(EmbeddedFrame::new("frame.png", frame_png(16))),
            MemorySink::new(),
            fixed_clock,
        );

        let (first, second) = tokio::join!(pipeline.run(&editor), pipeline.run(&editor));

        assert!(first.is_ok());
        assert!(matches!(second, Err(ExportError::InProgress)));
        assert_eq!(pipeline.sink().len(), 1);
        assert_eq!(lock(&editor).phase(), EditorPhase::Editing);
    }

    #[tokio::test]
    async fn test_dropped_export_releases_lock() {
        let editor = editor_with_photo(40, 40);
        let pipeline = ExportPipeline::with_clock(
            Yielding(EmbeddedFrame::new("frame.png", frame_png(16))),
            MemorySink::new(),
            fixed_clock,
        );

        let finished = tokio::select! {
            biased;
            _ = pipeline.run(&editor) => true,
            _ = async {} => false,
        };
        assert!(!finished);
        assert_eq!(lock(&editor).phase(), EditorPhase::Editing);
        assert!(pipeline.sink().is_empty());

        lock(&editor).apply(&CropEvent::ZoomTo(1.5)).unwrap();
        pipeline.run(&editor).await.unwrap();
        assert_eq!(pipeline.sink().len(), 1);
    }

    #[tokio::test]
    async fn test_directory_export() {
        let dir = tempfile::tempdir().unwrap();
        let editor = editor_with_photo(50, 30);
        let pipeline = ExportPipeline::with_clock(
            EmbeddedFrame::new("frame.png", frame_png(16)),
            DirectorySink::new(dir.path()),
            fixed_clock,
        );

        let receipt = pipeline.run(&editor).await.unwrap();

        let path = dir.path().join("atinwps-1700000000000.png");
        assert_eq!(receipt.location, path.display().to_string());
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), receipt.byte_len);
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_render_matches_export_geometry() {
        let mut controller = Controller::new(small_config()).unwrap();
        controller.select_source(gradient_photo(30, 20));
        let snapshot = controller.snapshot().unwrap();
        let frame = DecodedImage::transparent(4, 4);

        let out = render(&snapshot, &frame, &EditorLimits::default(), 20, FilterType::Nearest).unwrap();

        // Default crop: centered 20x20 square starting at x = 5
        assert_eq!(out.pixel(0, 0), [15, 0, 99, 255]);
    }
}
