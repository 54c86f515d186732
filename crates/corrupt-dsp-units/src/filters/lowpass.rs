// SPDX-License-Identifier: LGPL-3.0-or-later

//! Second-order anti-aliasing low-pass filter.
//!
//! Bilinear-transform Butterworth section whose cutoff is given as a ratio
//! rather than in Hz. A ratio `r` maps to a proportional rate (cutoff over
//! sample rate) of:
//! ```text
//!   prop = 0.5 / r   when r > 1
//!   prop = 0.5 * r   otherwise
//! ```
//! so `r = 1` puts the cutoff at Nyquist and larger ratios pull it down.
//! The proportional rate is floored at [`MIN_PROPORTIONAL_RATE`] before the
//! tangent is taken, keeping the poles inside the unit circle.

use std::f32::consts::{PI, SQRT_2};

use corrupt_dsp_lib::filters::{df1_process, df1_process_single};
use corrupt_dsp_lib::types::{Df1Coeffs, Df1State};

/// Smallest proportional rate fed to the coefficient design.
pub const MIN_PROPORTIONAL_RATE: f32 = 0.001;

/// Map a cutoff ratio to a proportional rate in (0, 0.5].
#[inline]
pub fn proportional_rate(ratio: f32) -> f32 {
    if ratio > 1.0 { 0.5 / ratio } else { 0.5 * ratio }
}

/// Design Butterworth low-pass coefficients for a cutoff ratio.
pub fn lowpass_coeffs(ratio: f32) -> Df1Coeffs {
    let prop = proportional_rate(ratio).max(MIN_PROPORTIONAL_RATE);
    let n = 1.0 / (PI * prop).tan();
    let n2 = n * n;
    let c1 = 1.0 / (1.0 + SQRT_2 * n + n2);

    Df1Coeffs {
        b0: c1,
        b1: 2.0 * c1,
        b2: c1,
        a0: 1.0,
        a1: 2.0 * c1 * (1.0 - n2),
        a2: c1 * (1.0 - SQRT_2 * n + n2),
    }
}

/// One channel of second-order low-pass filtering.
///
/// Coefficients are cached and only recomputed by [`set_ratio`](Self::set_ratio);
/// the two-sample input/output history persists across blocks until
/// [`reset`](Self::reset).
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    ratio: f32,
    coeffs: Df1Coeffs,
    state: Df1State,
}

impl Default for LowPassFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LowPassFilter {
    /// Create a filter with its cutoff at Nyquist (ratio 1).
    pub fn new() -> Self {
        Self {
            ratio: 1.0,
            coeffs: lowpass_coeffs(1.0),
            state: Df1State::default(),
        }
    }

    /// Set the cutoff ratio and recompute the coefficients.
    ///
    /// History is kept, so the response changes without a reset click.
    pub fn set_ratio(&mut self, ratio: f32) -> &mut Self {
        self.ratio = ratio;
        self.coeffs = lowpass_coeffs(ratio);
        self
    }

    /// Current cutoff ratio.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Cached coefficients.
    pub fn coeffs(&self) -> &Df1Coeffs {
        &self.coeffs
    }

    /// Filter history.
    pub fn state(&self) -> &Df1State {
        &self.state
    }

    /// Filter one sample.
    #[inline]
    pub fn apply_single(&mut self, x: f32) -> f32 {
        df1_process_single(x, &self.coeffs, &mut self.state)
    }

    /// Filter `buf` in place.
    pub fn apply(&mut self, buf: &mut [f32]) {
        df1_process(buf, &self.coeffs, &mut self.state);
    }

    /// Zero the history, keeping the coefficients.
    pub fn reset(&mut self) {
        self.state.clear();
    }
}
