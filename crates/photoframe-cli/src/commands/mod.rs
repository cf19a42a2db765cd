//! Subcommand implementations.

pub mod compose;
pub mod resolve;

use photoframe_core::config::EditorLimits;
use photoframe_core::editor::{CropEvent, Viewport};
use photoframe_core::CropState;

use crate::CropArgs;

impl CropArgs {
    /// The slider events that reproduce these arguments.
    pub fn events(&self) -> [CropEvent; 3] {
        [
            CropEvent::ZoomTo(self.zoom),
            CropEvent::RotateTo(self.rotate),
            CropEvent::PanTo {
                x: self.pan_x,
                y: self.pan_y,
            },
        ]
    }

    /// Crop state for these arguments, clamped to `limits`.
    pub fn to_crop(&self, viewport: &Viewport, limits: &EditorLimits) -> CropState {
        self.events()
            .iter()
            .fold(CropState::default(), |state, event| {
                state.apply(event, viewport, limits)
            })
    }
}
