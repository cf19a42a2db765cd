//! Interaction controller: the single owner of the editing session.
//!
//! # States
//!
//! ```text
//! Empty --select--> Editing --begin_export--> Exporting --finish_export--> Editing
//!   ^                  |
//!   +-----remove-------+
//! ```
//!
//! Gestures mutate the crop only in `Editing`. Selecting or removing an image
//! is always allowed and starts a new session generation; an export started
//! under an older generation is discarded before it saves anything.

mod crop;
mod gesture;

pub use crop::{CropEvent, Viewport};
pub use gesture::{pinch_distance, PinchTracker, Point};

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::{CampaignConfig, ConfigError};
use crate::decode::{decode_image, DecodeError, DecodedImage, FilterType};
use crate::export::{self, ExportError};
use crate::{CropState, MaskMode};

/// Errors from controller operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No image selected")]
    NoImage,

    #[error("An export is in progress")]
    ExportInFlight,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Observable controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Empty,
    Editing,
    Exporting,
}

/// A decoded user photo, shared without copying pixels.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: Arc<DecodedImage>,
}

impl SourceImage {
    /// Decode file bytes, honoring EXIF orientation.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_decoded(decode_image(bytes)?)
    }

    /// Wrap an already decoded raster.
    pub fn from_decoded(image: DecodedImage) -> Result<Self, DecodeError> {
        image.validate()?;
        Ok(Self {
            image: Arc::new(image),
        })
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn natural_width(&self) -> u32 {
        self.image.width
    }

    pub fn natural_height(&self) -> u32 {
        self.image.height
    }
}

/// Everything needed to render the current edit, detached from the controller.
#[derive(Debug, Clone)]
pub struct EditSnapshot {
    pub source: SourceImage,
    pub crop: CropState,
    pub mask: MaskMode,
}

/// Issued by [`Controller::begin_export`]; identifies the session the export
/// belongs to.
#[derive(Debug, Clone)]
pub struct ExportTicket {
    generation: u64,
    snapshot: EditSnapshot,
    config: Arc<CampaignConfig>,
}

impl ExportTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> &EditSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }
}

#[derive(Debug)]
struct Session {
    source: SourceImage,
    crop: CropState,
    mask: MaskMode,
    pinch: PinchTracker,
}

impl Session {
    fn new(source: SourceImage) -> Self {
        Self {
            source,
            crop: CropState::default(),
            mask: MaskMode::default(),
            pinch: PinchTracker::new(),
        }
    }
}

/// Owns the photo, the crop and mask state, and the export lock.
#[derive(Debug)]
pub struct Controller {
    config: Arc<CampaignConfig>,
    session: Option<Session>,
    exporting: bool,
    generation: u64,
}

impl Controller {
    /// Start an empty session. The config is validated here so every later
    /// transition can rely on ordered limits.
    pub fn new(config: CampaignConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            session: None,
            exporting: false,
            generation: 0,
        })
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn phase(&self) -> EditorPhase {
        match (&self.session, self.exporting) {
            (None, _) => EditorPhase::Empty,
            (Some(_), true) => EditorPhase::Exporting,
            (Some(_), false) => EditorPhase::Editing,
        }
    }

    /// Decode and select a new photo.
    ///
    /// On a decode failure the previous session, if any, is left untouched.
    pub fn select_image(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        let source = SourceImage::decode(bytes)?;
        self.select_source(source);
        Ok(())
    }

    /// Start a new session on `source` with default crop and mask.
    pub fn select_source(&mut self, source: SourceImage) {
        self.generation += 1;
        debug!(
            generation = self.generation,
            width = source.natural_width(),
            height = source.natural_height(),
            "Image selected"
        );
        self.session = Some(Session::new(source));
    }

    /// Drop the photo and all editing state.
    pub fn remove_image(&mut self) {
        if self.session.take().is_some() {
            self.generation += 1;
            debug!(generation = self.generation, "Image removed");
        }
    }

    fn editable(&mut self) -> Result<&mut Session, EditorError> {
        if self.exporting && self.session.is_some() {
            return Err(EditorError::ExportInFlight);
        }
        self.session.as_mut().ok_or(EditorError::NoImage)
    }

    /// Apply a gesture or slider event to the crop.
    pub fn apply(&mut self, event: &CropEvent) -> Result<CropState, EditorError> {
        let viewport = self.viewport().ok_or(EditorError::NoImage)?;
        let limits = self.config.limits.clone();
        let session = self.editable()?;

        session.crop = session.crop.apply(event, &viewport, &limits);
        debug!(?event, crop = ?session.crop, "Crop updated");
        Ok(session.crop)
    }

    pub fn pinch_start(&mut self, a: Point, b: Point) -> Result<(), EditorError> {
        self.editable()?.pinch.begin(a, b);
        Ok(())
    }

    /// Feed a pinch move. Returns the new crop if the pinch changed zoom.
    pub fn pinch_move(&mut self, a: Point, b: Point) -> Result<Option<CropState>, EditorError> {
        let threshold = self.config.limits.pinch_threshold_px;
        let event = self.editable()?.pinch.update(a, b, threshold);
        match event {
            Some(event) => self.apply(&event).map(Some),
            None => Ok(None),
        }
    }

    pub fn pinch_end(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pinch.end();
        }
    }

    pub fn set_mask(&mut self, mask: MaskMode) -> Result<(), EditorError> {
        self.editable()?.mask = mask;
        debug!(?mask, "Mask changed");
        Ok(())
    }

    pub fn toggle_mask(&mut self) -> Result<MaskMode, EditorError> {
        let session = self.editable()?;
        session.mask = session.mask.toggled();
        let mask = session.mask;
        debug!(?mask, "Mask changed");
        Ok(mask)
    }

    pub fn crop(&self) -> Option<CropState> {
        self.session.as_ref().map(|s| s.crop)
    }

    pub fn mask(&self) -> Option<MaskMode> {
        self.session.as_ref().map(|s| s.mask)
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.session.as_ref().map(|s| &s.source)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.session.as_ref().map(|s| Viewport {
            natural_width: s.source.natural_width(),
            natural_height: s.source.natural_height(),
            preview_size: self.config.preview_size,
        })
    }

    pub fn snapshot(&self) -> Option<EditSnapshot> {
        self.session.as_ref().map(|s| EditSnapshot {
            source: s.source.clone(),
            crop: s.crop,
            mask: s.mask,
        })
    }

    /// Enter `Exporting` and capture the state to export.
    ///
    /// # Errors
    ///
    /// `NoImage` when empty, `ExportInFlight` when another export holds the lock.
    pub fn begin_export(&mut self) -> Result<ExportTicket, EditorError> {
        if self.exporting {
            return Err(EditorError::ExportInFlight);
        }
        let snapshot = self.snapshot().ok_or(EditorError::NoImage)?;
        self.exporting = true;
        Ok(ExportTicket {
            generation: self.generation,
            snapshot,
            config: Arc::clone(&self.config),
        })
    }

    /// Whether the ticket still belongs to the live session.
    pub fn is_current(&self, ticket: &ExportTicket) -> bool {
        self.session.is_some() && self.generation == ticket.generation
    }

    /// Release the export lock. Returns whether the ticket was still current.
    pub fn finish_export(&mut self, ticket: &ExportTicket) -> bool {
        self.exporting = false;
        self.is_current(ticket)
    }

    /// Render the live preview at `preview_size` under `frame`.
    pub fn render_preview(&self, frame: &DecodedImage) -> Result<DecodedImage, ExportError> {
        let snapshot = self.snapshot().ok_or(ExportError::NoImage)?;
        export::render(
            &snapshot,
            frame,
            &self.config.limits,
            self.config.preview_size,
            FilterType::Bilinear,
        )
    }
}
