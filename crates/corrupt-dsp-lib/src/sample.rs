// SPDX-License-Identifier: LGPL-3.0-or-later

//! Host sample width abstraction.
//!
//! Hosts hand over either single- or double-precision buffers. The
//! processors keep their internal signal path in `f32` and only convert at
//! the buffer boundary, so one implementation serves both widths.

use std::fmt::Debug;

/// A host sample type (`f32` or `f64`).
pub trait Sample: Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static {
    /// Silence.
    const ZERO: Self;

    /// Convert to the internal `f32` representation.
    fn to_f32(self) -> f32;

    /// Convert from the internal `f32` representation.
    fn from_f32(value: f32) -> Self;
}

impl Sample for f32 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<S: Sample>(x: S) -> S {
        S::from_f32(x.to_f32())
    }

    #[test]
    fn test_f32_identity() {
        assert_eq!(roundtrip(0.25f32), 0.25);
        assert_eq!(f32::ZERO, 0.0);
    }

    #[test]
    fn test_f64_narrowing() {
        assert_eq!(0.5f64.to_f32(), 0.5f32);
        assert_eq!(f64::from_f32(-0.75), -0.75);
        assert_eq!(f64::ZERO, 0.0);
    }
}
