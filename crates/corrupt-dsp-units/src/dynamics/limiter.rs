// SPDX-License-Identifier: LGPL-3.0-or-later

//! Limiter: envelope-following peak limiter with soft or hard knee.
//!
//! A running envelope charges toward the rectified frame peak with the
//! attack coefficient and discharges with the release coefficient. The
//! envelope is compared with the threshold to derive a gain divisor
//! `g >= 1`:
//! ```text
//!   hard knee:  g = max(1, env / th)
//!   soft knee:  g = (1 + (env / th)^4)^(1/4)
//!   out       = clamp(x * trim / g, -1, 1)
//! ```
//! The soft knee starts reducing gradually below the threshold and
//! approaches the hard curve well above it.
//!
//! # Example
//!
//! ```
//! use corrupt_dsp_units::dynamics::limiter::Limiter;
//!
//! let mut limiter = Limiter::with_units(48000.0, 10.0, 500.0, 0.5, false);
//! let mut buf = vec![0.5f32; 256];
//! limiter.process(&mut buf, 256);
//! assert_eq!(limiter.linear_gr(), 1.0);
//! ```

use corrupt_dsp_lib::float::{limit1, undenormalise};

use crate::consts::DEFAULT_SAMPLE_RATE;
use crate::units::{db_to_gain, inverse_log};

/// Longest attack accepted by [`Limiter::set_attack_micros`].
pub const MAX_ATTACK_MICROS: f32 = 1563.9;

/// Longest release accepted by [`Limiter::set_release_millis`].
pub const MAX_RELEASE_MILLIS: f32 = 1571.755;

// 10^6 * log10(2) and 10^3 * log10(2): the envelope covers half the
// remaining distance within the given time.
const ATTACK_LOG_SCALE: f32 = 301_030.1;
const RELEASE_LOG_SCALE: f32 = 301.0301;

/// Normalized defaults of [`Limiter::new`].
pub const DEFAULT_ATTACK: f32 = 0.8;
pub const DEFAULT_RELEASE: f32 = 1.0;
pub const DEFAULT_THRESHOLD: f32 = 0.55;

/// Normalized trim giving unity gain.
pub const UNITY_TRIM: f32 = 0.5;

/// How a time constant was specified, so it can be re-derived when the
/// sample rate changes.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeSpec {
    Normalized(f32),
    Physical(f32),
}

/// Map a normalized threshold/trim in [0, 1] to a linear gain between
/// -20 dB and +20 dB.
#[inline]
pub fn normalized_to_gain(value: f32) -> f32 {
    db_to_gain(40.0 * value - 20.0)
}

/// Per-sample charge coefficient for an attack time in microseconds.
pub fn attack_coeff_micros(sr: f32, micros: f32) -> f32 {
    let micros = micros.clamp(0.0, MAX_ATTACK_MICROS);
    1.0 - inverse_log(-ATTACK_LOG_SCALE / (micros * sr), 10.0)
}

/// Per-sample discharge coefficient for a release time in milliseconds.
pub fn release_coeff_millis(sr: f32, millis: f32) -> f32 {
    let millis = millis.clamp(0.0, MAX_RELEASE_MILLIS);
    1.0 - inverse_log(-RELEASE_LOG_SCALE / (millis * sr), 10.0)
}

/// Envelope-following peak limiter.
#[derive(Debug, Clone)]
pub struct Limiter {
    sample_rate: f32,
    attack: TimeSpec,
    release: TimeSpec,
    attack_coeff: f32,
    release_coeff: f32,

    threshold: f32,
    soft_knee: bool,
    // 1/th for the hard knee, (1/th)^4 for the soft knee
    cached_threshold: f32,
    trim: f32,
    trim_gain: f32,

    envelope: f32,
    gain: f32,
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl Limiter {
    /// Create a soft-knee limiter with the default normalized settings.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_normalized(sample_rate, DEFAULT_ATTACK, DEFAULT_RELEASE, DEFAULT_THRESHOLD)
    }

    /// Create a soft-knee limiter from normalized attack, release and
    /// threshold values in [0, 1].
    pub fn with_normalized(sample_rate: f32, attack: f32, release: f32, threshold: f32) -> Self {
        let mut limiter = Self::blank(sample_rate);
        limiter
            .set_attack(attack)
            .set_release(release)
            .set_threshold(threshold)
            .set_soft_knee(true);
        limiter
    }

    /// Create a limiter from physical units.
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `attack_micros` - Attack in microseconds, at most [`MAX_ATTACK_MICROS`]
    /// * `release_millis` - Release in milliseconds, at most [`MAX_RELEASE_MILLIS`]
    /// * `threshold` - Normalized threshold (0 = -20 dB, 1 = +20 dB)
    /// * `soft_knee` - Use the soft knee curve
    pub fn with_units(
        sample_rate: f32,
        attack_micros: f32,
        release_millis: f32,
        threshold: f32,
        soft_knee: bool,
    ) -> Self {
        let mut limiter = Self::blank(sample_rate);
        limiter
            .set_attack_micros(attack_micros)
            .set_release_millis(release_millis)
            .set_threshold(threshold)
            .set_soft_knee(soft_knee);
        limiter
    }

    fn blank(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            attack: TimeSpec::Normalized(DEFAULT_ATTACK),
            release: TimeSpec::Normalized(DEFAULT_RELEASE),
            attack_coeff: 1.0,
            release_coeff: 1.0,
            threshold: DEFAULT_THRESHOLD,
            soft_knee: true,
            cached_threshold: 1.0,
            trim: UNITY_TRIM,
            trim_gain: 1.0,
            envelope: 0.0,
            gain: 1.0,
        }
    }

    /// Set the attack from a normalized value (coefficient `10^(-2a)`).
    pub fn set_attack(&mut self, attack: f32) -> &mut Self {
        self.attack = TimeSpec::Normalized(attack);
        self.update_times();
        self
    }

    /// Set the attack in microseconds.
    pub fn set_attack_micros(&mut self, micros: f32) -> &mut Self {
        self.attack = TimeSpec::Physical(micros);
        self.update_times();
        self
    }

    /// Set the release from a normalized value (coefficient `10^(-2-3r)`).
    pub fn set_release(&mut self, release: f32) -> &mut Self {
        self.release = TimeSpec::Normalized(release);
        self.update_times();
        self
    }

    /// Set the release in milliseconds.
    pub fn set_release_millis(&mut self, millis: f32) -> &mut Self {
        self.release = TimeSpec::Physical(millis);
        self.update_times();
        self
    }

    /// Set the normalized threshold (0 = -20 dB, 1 = +20 dB).
    pub fn set_threshold(&mut self, threshold: f32) -> &mut Self {
        self.threshold = threshold;
        self.update_threshold();
        self
    }

    /// Select the soft (true) or hard (false) knee.
    pub fn set_soft_knee(&mut self, soft_knee: bool) -> &mut Self {
        self.soft_knee = soft_knee;
        self.update_threshold();
        self
    }

    /// Set the normalized output trim (0.5 = unity, same scale as the
    /// threshold).
    pub fn set_trim(&mut self, trim: f32) -> &mut Self {
        self.trim = trim;
        self.trim_gain = normalized_to_gain(trim);
        self
    }

    /// Set the sample rate, re-deriving the physical time constants.
    pub fn set_sample_rate(&mut self, sr: f32) -> &mut Self {
        self.sample_rate = sr;
        self.update_times();
        self
    }

    pub fn soft_knee(&self) -> bool {
        self.soft_knee
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn trim(&self) -> f32 {
        self.trim
    }

    /// Threshold as a linear gain.
    pub fn threshold_gain(&self) -> f32 {
        normalized_to_gain(self.threshold)
    }

    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Linear gain reduction of the last processed frame, in (0, 1].
    ///
    /// 1.0 means no reduction.
    pub fn linear_gr(&self) -> f32 {
        if self.gain > 1.0 { 1.0 / self.gain } else { 1.0 }
    }

    /// Forget the envelope.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
        self.gain = 1.0;
    }

    /// Limit a planar buffer of `buf.len() / frames` channels in place.
    ///
    /// All channels of a frame share one envelope, so the stereo image is
    /// kept while limiting.
    pub fn process(&mut self, buf: &mut [f32], frames: usize) {
        if frames == 0 {
            return;
        }
        let channels = buf.len() / frames;

        for f in 0..frames {
            let mut peak = 0.0f32;
            for c in 0..channels {
                peak = peak.max(buf[c * frames + f].abs());
            }

            let coeff = if peak > self.envelope {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.envelope = undenormalise(self.envelope + (peak - self.envelope) * coeff);
            self.gain = self.gain_for(self.envelope);

            let k = self.trim_gain / self.gain;
            for c in 0..channels {
                let idx = c * frames + f;
                buf[idx] = limit1(buf[idx] * k);
            }
        }
    }

    #[inline]
    fn gain_for(&self, envelope: f32) -> f32 {
        if self.soft_knee {
            let e2 = envelope * envelope;
            (1.0 + self.cached_threshold * e2 * e2).sqrt().sqrt()
        } else {
            (envelope * self.cached_threshold).max(1.0)
        }
    }

    fn update_times(&mut self) {
        self.attack_coeff = match self.attack {
            TimeSpec::Normalized(a) => inverse_log(-2.0 * a, 10.0),
            TimeSpec::Physical(us) => attack_coeff_micros(self.sample_rate, us),
        };
        self.release_coeff = match self.release {
            TimeSpec::Normalized(r) => inverse_log(-2.0 - 3.0 * r, 10.0),
            TimeSpec::Physical(ms) => release_coeff_millis(self.sample_rate, ms),
        };
    }

    fn update_threshold(&mut self) {
        let inv = 1.0 / normalized_to_gain(self.threshold);
        self.cached_threshold = if self.soft_knee {
            let inv2 = inv * inv;
            inv2 * inv2
        } else {
            inv
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn sine(len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (i as f32 * 2.0 * std::f32::consts::PI / 64.0).sin())
            .collect()
    }

    #[test]
    fn test_normalized_to_gain() {
        assert_approx_eq!(f32, normalized_to_gain(0.0), 0.1, epsilon = 1e-6);
        assert_approx_eq!(f32, normalized_to_gain(0.5), 1.0, ulps = 1);
        assert_approx_eq!(f32, normalized_to_gain(1.0), 10.0, epsilon = 1e-5);
    }

    #[test]
    fn test_time_constants_bounded() {
        let sr = 44100.0;
        let a = attack_coeff_micros(sr, 10_000.0);
        assert_approx_eq!(f32, a, attack_coeff_micros(sr, MAX_ATTACK_MICROS), ulps = 1);
        let r = release_coeff_millis(sr, 10_000.0);
        assert_approx_eq!(f32, r, release_coeff_millis(sr, MAX_RELEASE_MILLIS), ulps = 1);
        assert!(a > 0.0 && a < 1.0);
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn test_time_constants_follow_sample_rate() {
        // Same wall-clock time at twice the rate: (1 - c2)^2 == 1 - c1
        let c1 = attack_coeff_micros(48000.0, 500.0);
        let c2 = attack_coeff_micros(96000.0, 500.0);
        assert_approx_eq!(f32, (1.0 - c2) * (1.0 - c2), 1.0 - c1, epsilon = 1e-5);

        let mut limiter = Limiter::with_units(48000.0, 500.0, 100.0, 0.5, false);
        limiter.set_sample_rate(96000.0);
        assert_approx_eq!(f32, limiter.attack_coeff(), c2, ulps = 1);
    }

    #[test]
    fn test_hard_knee_below_threshold_is_transparent() {
        let mut limiter = Limiter::with_units(44100.0, 10.0, 500.0, 0.6, false);
        let input = sine(1024, 0.9);
        let mut buf = input.clone();
        limiter.process(&mut buf, 1024);
        assert_eq!(buf, input);
        assert_eq!(limiter.linear_gr(), 1.0);
    }

    #[test]
    fn test_hard_knee_reduces_loud_signal() {
        let mut limiter = Limiter::with_units(44100.0, 10.0, 500.0, 0.4, false);
        let mut buf = vec![0.9f32; 4096];
        limiter.process(&mut buf, 4096);
        let th = normalized_to_gain(0.4);
        assert_approx_eq!(f32, buf[4095], th, epsilon = 1e-3);
        assert_approx_eq!(f32, limiter.linear_gr(), th / 0.9, epsilon = 1e-3);
    }

    #[test]
    fn test_soft_knee_is_gentler_than_hard() {
        let mut soft = Limiter::with_units(44100.0, 10.0, 500.0, 0.4, true);
        let mut hard = Limiter::with_units(44100.0, 10.0, 500.0, 0.4, false);
        let mut a = vec![0.5f32; 2048];
        let mut b = a.clone();
        soft.process(&mut a, 2048);
        hard.process(&mut b, 2048);
        // Below the threshold only the soft curve reduces.
        assert!(soft.linear_gr() < 1.0);
        assert!(soft.linear_gr() <= hard.linear_gr());
    }

    #[test]
    fn test_output_is_clamped() {
        let mut limiter = Limiter::with_units(44100.0, 1563.9, 1000.0, 1.0, false);
        limiter.set_trim(1.0);
        let mut buf = vec![0.8f32; 64];
        limiter.process(&mut buf, 64);
        assert!(buf.iter().all(|v| v.abs() <= 1.0));
    }

    #[test]
    fn test_linked_channels() {
        let mut limiter = Limiter::with_units(44100.0, 10.0, 500.0, 0.3, false);
        let frames = 512;
        let mut buf = vec![0.0f32; frames * 2];
        buf[..frames].fill(0.9);
        buf[frames..].fill(0.1);
        limiter.process(&mut buf, frames);
        let k = buf[frames - 1] / 0.9;
        assert_approx_eq!(f32, buf[2 * frames - 1], 0.1 * k, epsilon = 1e-5);
    }

    #[test]
    fn test_reset() {
        let mut limiter = Limiter::with_units(44100.0, 10.0, 500.0, 0.2, false);
        let mut buf = vec![1.0f32; 256];
        limiter.process(&mut buf, 256);
        assert!(limiter.linear_gr() < 1.0);
        limiter.reset();
        assert_eq!(limiter.linear_gr(), 1.0);
    }

    #[test]
    fn test_default_is_soft_knee() {
        let limiter = Limiter::new(44100.0);
        assert!(limiter.soft_knee());
        assert_approx_eq!(f32, limiter.attack_coeff(), inverse_log(-1.6, 10.0), ulps = 2);
    }
}
