//! Two-finger pinch tracking.
//!
//! Touch events arrive as pairs of contact points. The tracker remembers the
//! distance at the last emitted step and only emits a zoom event once the
//! fingers have moved apart or together by more than a threshold, so small
//! jitter while panning doesn't change zoom.

use serde::{Deserialize, Serialize};

use super::crop::CropEvent;

/// A contact point in preview pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two contact points.
#[inline]
pub fn pinch_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Tracks one pinch gesture from first touch to release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinchTracker {
    last_distance: Option<f64>,
}

impl PinchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pinch with the two initial contact points.
    pub fn begin(&mut self, a: Point, b: Point) {
        self.last_distance = Some(pinch_distance(a, b));
    }

    /// Feed the current contact points.
    ///
    /// Returns a `CropEvent::Pinch` once the distance has changed by more
    /// than `threshold_px` since the last emitted event, and `None`
    /// otherwise or when no pinch is active.
    pub fn update(&mut self, a: Point, b: Point, threshold_px: f64) -> Option<CropEvent> {
        let last = self.last_distance?;
        let distance = pinch_distance(a, b);
        let delta = distance - last;

        if !delta.is_finite() || delta.abs() <= threshold_px {
            return None;
        }

        self.last_distance = Some(distance);
        Some(CropEvent::Pinch {
            distance_delta: delta,
        })
    }

    /// Release the pinch.
    pub fn end(&mut self) {
        self.last_distance = None;
    }

    pub fn is_active(&self) -> bool {
        self.last_distance.is_some()
    }
}
