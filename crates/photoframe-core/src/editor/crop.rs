//! Gesture and slider events as pure transitions over [`CropState`].

use serde::{Deserialize, Serialize};

use crate::config::EditorLimits;
use crate::{normalize_rotation, CropState, PanOffset};

/// One user input that changes the crop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropEvent {
    /// Mouse wheel notch. Negative `delta_y` zooms in, positive zooms out.
    Wheel { delta_y: f64 },
    /// Change in distance between two fingers, in preview pixels.
    Pinch { distance_delta: f64 },
    /// Pointer drag, in preview pixels. Positive `dx` drags the photo right.
    Drag { dx: f64, dy: f64 },
    /// Set the pan directly, normalized to `[-1, 1]` per axis.
    PanTo { x: f64, y: f64 },
    /// Zoom slider.
    ZoomTo(f64),
    /// Rotation slider, in degrees.
    RotateTo(f64),
    /// Rotate by whole steps of `rotation_step`; negative is counter-clockwise.
    RotateBy { steps: i32 },
    /// Back to zoom 1, no rotation, centered.
    Reset,
}

/// What the user is looking at: the photo's natural size and the side of
/// the square preview the pointer moves over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub natural_width: u32,
    pub natural_height: u32,
    pub preview_size: u32,
}

impl Viewport {
    /// Side of the framed region in source pixels at `zoom`.
    fn region_side(&self, zoom: f64) -> f64 {
        self.natural_width.min(self.natural_height) as f64 / zoom
    }
}

impl CropState {
    /// Apply one event, returning the new state.
    ///
    /// The result always has zoom within `limits`, offsets within `[-1, 1]`
    /// and rotation in `[0, 360)`.
    pub fn apply(self, event: &CropEvent, viewport: &Viewport, limits: &EditorLimits) -> CropState {
        let mut next = self;
        match *event {
            CropEvent::Wheel { delta_y } => {
                if delta_y < 0.0 {
                    next.zoom += limits.zoom_step;
                } else if delta_y > 0.0 {
                    next.zoom -= limits.zoom_step;
                }
            }
            CropEvent::Pinch { distance_delta } => {
                if distance_delta.is_finite() {
                    next.zoom += distance_delta * limits.pinch_zoom_per_px;
                }
            }
            CropEvent::Drag { dx, dy } => {
                next.offset = drag_offset(self, viewport, limits, dx, dy);
            }
            CropEvent::PanTo { x, y } => {
                next.offset = PanOffset::new(x, y);
            }
            CropEvent::ZoomTo(zoom) => {
                next.zoom = zoom;
            }
            CropEvent::RotateTo(degrees) => {
                next.rotation_degrees = clamp_rotation(degrees, limits);
            }
            CropEvent::RotateBy { steps } => {
                next.rotation_degrees = step_rotation(self.rotation_degrees, steps, limits);
            }
            CropEvent::Reset => {
                next = CropState::default();
                next.rotation_degrees = clamp_rotation(0.0, limits);
            }
        }

        next.zoom = limits.clamp_zoom(next.zoom);
        next.offset = next.offset.clamped();
        next.rotation_degrees = normalize_rotation(next.rotation_degrees);
        next
    }
}

/// Move the crop center opposite to the drag so the photo follows the
/// pointer. Offsets stop where the region meets the photo edge.
fn drag_offset(state: CropState, viewport: &Viewport, limits: &EditorLimits, dx: f64, dy: f64) -> PanOffset {
    if viewport.preview_size == 0 || !dx.is_finite() || !dy.is_finite() {
        return state.offset;
    }

    let side = viewport.region_side(limits.clamp_zoom(state.zoom));
    let px_to_source = side / viewport.preview_size as f64;

    let axis = |offset: f64, delta: f64, dim: u32| -> f64 {
        if dim == 0 {
            return offset;
        }
        let half = dim as f64 / 2.0;
        let reach = (1.0 - side / dim as f64).max(0.0);
        (offset - delta * px_to_source / half).clamp(-reach, reach)
    };

    PanOffset {
        x: axis(state.offset.x, dx, viewport.natural_width),
        y: axis(state.offset.y, dy, viewport.natural_height),
    }
}

fn clamp_rotation(degrees: f64, limits: &EditorLimits) -> f64 {
    let normalized = normalize_rotation(degrees);
    if normalized < limits.min_rotation {
        limits.min_rotation
    } else if normalized >= limits.max_rotation {
        rotation_ceiling(limits)
    } else {
        normalized
    }
}

/// Highest reachable angle; `max_rotation` is exclusive.
fn rotation_ceiling(limits: &EditorLimits) -> f64 {
    (limits.max_rotation - limits.rotation_step).max(limits.min_rotation)
}

/// A full-turn range wraps; a partial range stops at its ends.
fn step_rotation(current: f64, steps: i32, limits: &EditorLimits) -> f64 {
    let degrees = current + steps as f64 * limits.rotation_step;
    if limits.min_rotation <= 0.0 && limits.max_rotation >= 360.0 {
        return normalize_rotation(degrees);
    }
    if !degrees.is_finite() {
        return clamp_rotation(current, limits);
    }
    degrees.clamp(limits.min_rotation, rotation_ceiling(limits))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn event_strategy() -> impl Strategy<Value = CropEvent> {
        prop_oneof![
            (-500.0f64..500.0).prop_map(|delta_y| CropEvent::Wheel { delta_y }),
            (-500.0f64..500.0).prop_map(|distance_delta| CropEvent::Pinch { distance_delta }),
            (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(dx, dy)| CropEvent::Drag { dx, dy }),
            (-3.0f64..3.0, -3.0f64..3.0).prop_map(|(x, y)| CropEvent::PanTo { x, y }),
            (-10.0f64..10.0).prop_map(CropEvent::ZoomTo),
            (-1000.0f64..1000.0).prop_map(CropEvent::RotateTo),
            (-400i32..400).prop_map(|steps| CropEvent::RotateBy { steps }),
            Just(CropEvent::Reset),
        ]
    }

    proptest! {
        /// Property: any event sequence keeps the state within its invariants.
        #[test]
        fn prop_state_stays_valid(
            width in 1u32..=5000,
            height in 1u32..=5000,
            events in prop::collection::vec(event_strategy(), 0..40),
        ) {
            let limits = EditorLimits::default();
            let vp = Viewport { natural_width: width, natural_height: height, preview_size: 500 };
            let mut state = CropState::default();

            for event in &events {
                state = state.apply(event, &vp, &limits);
                prop_assert!(state.zoom >= limits.min_zoom && state.zoom <= limits.max_zoom);
                prop_assert!((-1.0..=1.0).contains(&state.offset.x));
                prop_assert!((-1.0..=1.0).contains(&state.offset.y));
                prop_assert!((0.0..360.0).contains(&state.rotation_degrees));
            }
        }

        /// Property: rotation never leaves a configured partial range.
        #[test]
        fn prop_rotation_stays_in_configured_range(
            min in 0u32..180,
            span in 1u32..=180,
            step in prop::sample::select(vec![0.5f64, 1.0, 5.0, 15.0]),
            events in prop::collection::vec(event_strategy(), 0..40),
        ) {
            let limits = EditorLimits {
                min_rotation: min as f64,
                max_rotation: (min + span) as f64,
                rotation_step: step,
                ..EditorLimits::default()
            };
            let vp = Viewport { natural_width: 800, natural_height: 600, preview_size: 500 };
            let mut state = CropState::default().apply(&CropEvent::Reset, &vp, &limits);
            prop_assert!(state.rotation_degrees >= limits.min_rotation);

            for event in &events {
                state = state.apply(event, &vp, &limits);
                prop_assert!(state.rotation_degrees >= limits.min_rotation);
                prop_assert!(state.rotation_degrees < limits.max_rotation);
            }
        }
    }
}
