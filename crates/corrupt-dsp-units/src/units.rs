// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions.
//!
//! Time, gain and normalized-control conversions shared by the processors.

use crate::consts::{MAX_LFO_RATE, MIN_LFO_RATE};

/// Convert seconds to sample count.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `time` - Time in seconds
///
/// # Returns
/// Number of samples
#[inline]
pub fn seconds_to_samples(sr: f32, time: f32) -> f32 {
    time * sr
}

/// Convert decibels to linear gain (amplitude ratio).
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear gain (amplitude ratio) to decibels.
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}

/// Invert a logarithm: recover the original number from its logarithm in
/// `base`, e.g. `inverse_log(-0.30103, 10.0) ≈ 0.5`.
#[inline]
pub fn inverse_log(value: f32, base: f32) -> f32 {
    base.powf(value)
}

/// Map a normalized LFO rate percentage to Hz within
/// `[MIN_LFO_RATE, MAX_LFO_RATE]`.
#[inline]
pub fn lfo_rate_hz(percentage: f32) -> f32 {
    MIN_LFO_RATE + percentage * (MAX_LFO_RATE - MIN_LFO_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_time_conversions() {
        assert_approx_eq!(f32, seconds_to_samples(48000.0, 0.5), 24000.0, ulps = 2);
    }

    #[test]
    fn test_db_gain_roundtrip_points() {
        assert_approx_eq!(f32, db_to_gain(0.0), 1.0, ulps = 2);
        assert_approx_eq!(f32, db_to_gain(20.0), 10.0, epsilon = 1e-5);
        assert_approx_eq!(f32, db_to_gain(-20.0), 0.1, epsilon = 1e-6);
        assert_approx_eq!(f32, gain_to_db(0.1), -20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_inverse_log() {
        assert_approx_eq!(f32, inverse_log(-0.301_03, 10.0), 0.5, epsilon = 1e-5);
        assert_approx_eq!(f32, inverse_log(3.0, 2.0), 8.0, epsilon = 1e-5);
    }

    #[test]
    fn test_lfo_rate_hz() {
        assert_approx_eq!(f32, lfo_rate_hz(0.0), MIN_LFO_RATE, ulps = 2);
        assert_approx_eq!(f32, lfo_rate_hz(1.0), MAX_LFO_RATE, ulps = 2);
    }
}
