//! Clip masks for the composite surface.
//!
//! Masks are evaluated per-pixel and return a coverage value from 0.0
//! (clipped) to 1.0 (kept). Edges are feathered with the smootherstep
//! function so the exported outline is antialiased.

pub mod circle;

pub use circle::CircleClip;

/// `6t^5 - 15t^4 + 10t^3` on `t` clamped to `[0, 1]`.
///
/// Flat first and second derivatives at both ends, so a feathered rim blends
/// into the fill without a visible ring.
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smootherstep_endpoints_and_clamp() {
        assert_eq!(smootherstep(0.0), 0.0);
        assert_eq!(smootherstep(1.0), 1.0);
        assert_eq!(smootherstep(-2.0), 0.0);
        assert_eq!(smootherstep(3.0), 1.0);
        assert!((smootherstep(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smootherstep_is_odd_about_midpoint() {
        for i in 0..=50 {
            let d = i as f32 / 100.0;
            let sum = smootherstep(0.5 - d) + smootherstep(0.5 + d);
            assert!((sum - 1.0).abs() < 1e-5, "asymmetric at d = {d}");
        }
    }

    #[test]
    fn test_smootherstep_never_decreases() {
        let samples: Vec<f32> = (0..=64).map(|i| smootherstep(i as f32 / 64.0)).collect();
        assert!(samples.windows(2).all(|w| w[1] >= w[0]));
    }
}
