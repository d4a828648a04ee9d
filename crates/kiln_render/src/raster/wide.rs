//! Eight-lane `f32` vector built from two `glam::Vec4` halves.
//!
//! Only the operations the quad path needs. Every op is a plain lane-wise IEEE
//! operation, so results match the scalar code bit for bit when the same
//! expression order is used.

use glam::Vec4;
use std::ops::{Add, Mul, Sub};

pub const LANES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F32x8 {
    lo: Vec4,
    hi: Vec4,
}

impl F32x8 {
    #[inline]
    pub fn splat(value: f32) -> Self {
        Self {
            lo: Vec4::splat(value),
            hi: Vec4::splat(value),
        }
    }

    #[inline]
    pub fn from_array(values: [f32; LANES]) -> Self {
        Self {
            lo: Vec4::new(values[0], values[1], values[2], values[3]),
            hi: Vec4::new(values[4], values[5], values[6], values[7]),
        }
    }

    /// Gather one lane from each of the first [`LANES`] elements of `items`.
    #[inline]
    pub fn gather<T>(items: &[T], f: impl Fn(&T) -> f32) -> Self {
        debug_assert!(items.len() >= LANES);
        Self::from_array(std::array::from_fn(|lane| f(&items[lane])))
    }

    #[inline]
    pub fn to_array(self) -> [f32; LANES] {
        let lo = self.lo.to_array();
        let hi = self.hi.to_array();
        [lo[0], lo[1], lo[2], lo[3], hi[0], hi[1], hi[2], hi[3]]
    }
}

impl Add for F32x8 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            lo: self.lo + rhs.lo,
            hi: self.hi + rhs.hi,
        }
    }
}

impl Sub for F32x8 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            lo: self.lo - rhs.lo,
            hi: self.hi - rhs.hi,
        }
    }
}

impl Mul for F32x8 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            lo: self.lo * rhs.lo,
            hi: self.hi * rhs.hi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lanes_round_trip_in_order() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(F32x8::from_array(values).to_array(), values);
    }

    #[test]
    fn arithmetic_is_lane_wise() {
        let a = F32x8::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let b = F32x8::splat(2.0);
        assert_eq!((a * b).to_array(), [2.0, 4.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0]);
        assert_eq!((a - b).to_array()[7], 6.0);
        assert_eq!((a + b).to_array()[0], 3.0);
    }
}
