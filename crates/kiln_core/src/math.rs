//! Math utilities
//!
//! Re-exports glam with the scalar helpers the frame pipeline needs.

pub use glam::*;

use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Linear blend that returns `a` exactly at `t = 0` and `b` exactly at `t = 1`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Vector form of [`lerp`], exact at both endpoints.
#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a * (1.0 - t) + b * t
}

/// Wrap an angle in radians into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Interpolate between two angles along the shorter arc.
pub fn lerp_angle_shortest(a: f32, b: f32, t: f32) -> f32 {
    a + wrap_angle(b - a) * t
}

/// How rotation is blended between two simulation ticks.
///
/// `Linear` blends the raw angles and snaps visibly when an entity crosses the
/// ±180° seam. `ShortestArc` removes the snap but changes which way some
/// rotations sweep, so it is opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationInterpolation {
    #[default]
    Linear,
    ShortestArc,
}

impl RotationInterpolation {
    #[inline]
    pub fn blend(self, from: f32, to: f32, t: f32) -> f32 {
        match self {
            Self::Linear => lerp(from, to, t),
            Self::ShortestArc => lerp_angle_shortest(from, to, t),
        }
    }
}

/// SplitMix64 finalizer: full avalanche of a 64-bit value.
#[inline]
pub const fn mix64(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Fold `value` into `seed`, avalanching the result.
#[inline]
pub const fn hash_combine(seed: u64, value: u64) -> u64 {
    mix64(seed ^ value.wrapping_add(0x9e37_79b9_7f4a_7c15).wrapping_add(seed << 6).wrapping_add(seed >> 2))
}

/// Deterministic SplitMix64 random stream, used for reproducible demo scenes.
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        mix64(self.state)
    }

    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `[min, max)`.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        lerp(min, max, self.next_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn wrap_angle_stays_in_half_open_range() {
        assert_relative_eq!(wrap_angle(3.0 * PI), PI, epsilon = 1e-5);
        assert_relative_eq!(wrap_angle(-PI), PI, epsilon = 1e-5);
        assert_relative_eq!(wrap_angle(0.5), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn shortest_arc_crosses_the_seam() {
        let from = 179f32.to_radians();
        let to = (-179f32).to_radians();
        let mid = lerp_angle_shortest(from, to, 0.5);
        assert_relative_eq!(wrap_angle(mid).abs(), PI, epsilon = 1e-4);
    }

    #[test]
    fn lerp_hits_both_endpoints_exactly() {
        assert_eq!(lerp(0.1, 0.3, 0.0), 0.1);
        assert_eq!(lerp(0.1, 0.3, 1.0), 0.3);
        assert_eq!(lerp_vec2(Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn linear_rotation_sweeps_the_long_way() {
        let from = 179f32.to_radians();
        let to = (-179f32).to_radians();
        let linear = RotationInterpolation::Linear.blend(from, to, 0.5);
        let shortest = RotationInterpolation::ShortestArc.blend(from, to, 0.5);
        assert_relative_eq!(linear, 0.0, epsilon = 1e-5);
        assert_relative_eq!(wrap_angle(shortest).abs(), PI, epsilon = 1e-4);
    }

    #[test]
    fn hash_combine_is_order_sensitive() {
        let a = hash_combine(hash_combine(0, 1), 2);
        let b = hash_combine(hash_combine(0, 2), 1);
        assert_ne!(a, b);
        assert_ne!(mix64(1), mix64(2));
    }

    #[test]
    fn rng_is_deterministic_and_bounded() {
        let mut a = DeterministicRng::new(42);
        let mut b = DeterministicRng::new(42);
        for _ in 0..100 {
            let x = a.next_f32();
            assert_eq!(x, b.next_f32());
            assert!((0.0..1.0).contains(&x));
        }
    }
}
