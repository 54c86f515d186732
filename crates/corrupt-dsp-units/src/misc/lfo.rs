// SPDX-License-Identifier: LGPL-3.0-or-later

//! Low-frequency oscillator used for every modulated control.
//!
//! The waveform is a normalized sine with the following properties:
//! - f(0.0) = 0.0 and f(1.0) = 0.0
//! - f(0.5) = 1.0 (peak at center)
//! - Output always lies in [0.0, 1.0]
//!
//! The shape is sampled once into a lookup table and read back with linear
//! interpolation, so ticking the oscillator never calls into `sin`.

use std::f32::consts::PI;

use once_cell::sync::Lazy;

use crate::consts::DEFAULT_SAMPLE_RATE;

/// Number of points in one waveform period.
pub const LFO_TABLE_SIZE: usize = 128;

const LFO_M_2PI: f32 = 2.0 * PI;

/// One period of [`sine`], plus a guard point equal to the first entry so
/// the interpolation never needs to wrap.
static SINE_TABLE: Lazy<[f32; LFO_TABLE_SIZE + 1]> = Lazy::new(|| {
    let mut table = [0.0; LFO_TABLE_SIZE + 1];
    for (i, v) in table.iter_mut().enumerate().take(LFO_TABLE_SIZE) {
        *v = sine(i as f32 / LFO_TABLE_SIZE as f32);
    }
    table[LFO_TABLE_SIZE] = table[0];
    table
});

/// Sine-based LFO waveform.
///
/// # Arguments
/// * `phase` - Phase value in range [0.0, 1.0]
///
/// # Returns
/// Amplitude in range [0.0, 1.0] with peak at phase 0.5
pub fn sine(phase: f32) -> f32 {
    if phase >= 0.5 {
        0.5 + 0.5 * ((0.75 - phase) * LFO_M_2PI).sin()
    } else {
        0.5 + 0.5 * ((phase - 0.25) * LFO_M_2PI).sin()
    }
}

/// Table lookup of [`sine`] with linear interpolation between points.
#[inline]
pub fn sine_lookup(phase: f32) -> f32 {
    let table = &*SINE_TABLE;
    let pos = phase * LFO_TABLE_SIZE as f32;
    let idx = (pos as usize).min(LFO_TABLE_SIZE - 1);
    let frac = pos - idx as f32;
    table[idx] + (table[idx + 1] - table[idx]) * frac
}

/// Stateful oscillator producing one modulation value per frame.
///
/// # Examples
///
/// ```
/// use corrupt_dsp_units::misc::lfo::Lfo;
///
/// let mut lfo = Lfo::new(44100.0);
/// lfo.set_rate(2.0);
/// let v = lfo.tick();
/// assert!((0.0..=1.0).contains(&v));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    sample_rate: f32,
    rate: f32,
    phase: f32,
    phase_inc: f32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl Lfo {
    /// Create an oscillator at rest (rate 0 Hz, phase 0).
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            rate: 0.0,
            phase: 0.0,
            phase_inc: 0.0,
        }
    }

    /// Set the oscillation rate in Hz.
    ///
    /// Callers clamp the rate themselves; the phase is left untouched.
    pub fn set_rate(&mut self, hz: f32) -> &mut Self {
        self.rate = hz;
        self.update_increment();
        self
    }

    /// Set the sample rate in Hz, keeping the rate in Hz constant.
    pub fn set_sample_rate(&mut self, sr: f32) -> &mut Self {
        self.sample_rate = sr;
        self.update_increment();
        self
    }

    /// Current rate in Hz.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Current phase in [0.0, 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Rewind to phase 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Return the value at the current phase, then advance by one sample.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        let value = sine_lookup(self.phase);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        value
    }

    fn update_increment(&mut self) {
        self.phase_inc = if self.sample_rate > 0.0 {
            (self.rate / self.sample_rate).max(0.0)
        } else {
            0.0
        };
    }
}
