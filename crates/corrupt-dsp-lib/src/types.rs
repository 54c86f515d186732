// SPDX-License-Identifier: LGPL-3.0-or-later

//! Core data types for the DSP library.

/// Coefficients for a single direct-form-I biquad section.
///
/// Implements the difference equation:
/// ```text
///   y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// `a0` is kept for completeness. Designs in this workspace always produce
/// `a0 == 1`, so the kernel never divides by it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Df1Coeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Default for Df1Coeffs {
    /// Pass-through section.
    fn default() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

/// Delay memory of a direct-form-I section: two input and two output
/// history samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Df1State {
    pub x1: f32,
    pub x2: f32,
    pub y1: f32,
    pub y2: f32,
}

impl Df1State {
    /// Zero the history.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
