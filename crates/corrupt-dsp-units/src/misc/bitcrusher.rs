// SPDX-License-Identifier: LGPL-3.0-or-later

//! Amplitude quantizer ("bit crusher") with LFO-modulated resolution.
//!
//! The crush amount is normalized: 1.0 leaves the signal untouched and 0.0
//! reduces it to a single bit. In between the resolution is
//! ```text
//!   bits  = 1 + floor(amount * 15)
//!   steps = 2^(bits - 1)
//!   q(x)  = round(x * steps) / steps
//! ```
//! Each sample is driven into the quantizer by the input mix, scaled by the
//! output mix (makeup gain) and blended with the unprocessed sample by the
//! wet mix.
//!
//! Buffers are planar: `frames` samples of channel 0, then channel 1, and
//! so on. The LFO advances once per frame, so all channels of a frame are
//! quantized with the same resolution.

use crate::consts::{DEFAULT_SAMPLE_RATE, MAX_BIT_DEPTH};
use crate::misc::lfo::Lfo;
use crate::units::lfo_rate_hz;

/// Makeup gain applied to strongly crushed signals.
pub const MAKEUP_GAIN_COARSE: f32 = 0.25;

/// Makeup gain applied to mildly crushed signals.
pub const MAKEUP_GAIN_FINE: f32 = 1.25;

/// Amount above which the fine makeup gain applies.
pub const MAKEUP_GAIN_KNEE: f32 = 0.4;

/// Bit depth reducer.
///
/// # Examples
///
/// ```
/// use corrupt_dsp_units::misc::bitcrusher::BitCrusher;
///
/// let mut crusher = BitCrusher::new(44100.0);
/// crusher.set_amount(0.0);
/// let mut buf = [0.3f32, -0.7, 0.1, 0.9];
/// crusher.process(&mut buf, 4);
/// assert_eq!(buf, [0.0, -1.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct BitCrusher {
    amount: f32,
    input_mix: f32,
    output_mix: f32,
    mix: f32,
    bits: u32,
    steps: f32,

    lfo: Lfo,
    lfo_enabled: bool,
    lfo_depth: f32,
    lfo_min: f32,
    lfo_max: f32,
}

impl Default for BitCrusher {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl BitCrusher {
    /// Create a transparent crusher (amount 1, unity drive, gain and mix).
    pub fn new(sample_rate: f32) -> Self {
        let mut crusher = Self {
            amount: 1.0,
            input_mix: 1.0,
            output_mix: 1.0,
            mix: 1.0,
            bits: MAX_BIT_DEPTH,
            steps: 0.0,
            lfo: Lfo::new(sample_rate),
            lfo_enabled: false,
            lfo_depth: 0.0,
            lfo_min: 1.0,
            lfo_max: 1.0,
        };
        crusher.set_amount(1.0);
        crusher
    }

    /// Number of bits for a normalized amount.
    #[inline]
    pub fn bits_for(amount: f32) -> u32 {
        let amount = amount.clamp(0.0, 1.0);
        1 + (amount * (MAX_BIT_DEPTH - 1) as f32).floor() as u32
    }

    /// Depth-dependent makeup gain for a normalized amount.
    ///
    /// Unity when nothing is crushed, [`MAKEUP_GAIN_FINE`] above
    /// [`MAKEUP_GAIN_KNEE`], [`MAKEUP_GAIN_COARSE`] otherwise.
    pub fn makeup_gain(amount: f32) -> f32 {
        if amount >= 1.0 {
            1.0
        } else if amount > MAKEUP_GAIN_KNEE {
            MAKEUP_GAIN_FINE
        } else {
            MAKEUP_GAIN_COARSE
        }
    }

    /// Set the crush amount (1 = transparent, 0 = one bit).
    pub fn set_amount(&mut self, amount: f32) -> &mut Self {
        self.amount = amount.clamp(0.0, 1.0);
        self.bits = Self::bits_for(self.amount);
        self.steps = steps_for(self.bits);
        self.cache_lfo();
        self
    }

    /// Set the gain driving the signal into the quantizer.
    pub fn set_input_mix(&mut self, gain: f32) -> &mut Self {
        self.input_mix = gain;
        self
    }

    /// Set the gain applied to the quantized signal.
    pub fn set_output_mix(&mut self, gain: f32) -> &mut Self {
        self.output_mix = gain;
        self
    }

    /// Set the blend between the unprocessed (0) and crushed (1) signal.
    pub fn set_mix(&mut self, mix: f32) -> &mut Self {
        self.mix = mix;
        self
    }

    /// Enable LFO modulation of the amount.
    ///
    /// A zero `rate_percentage` disables the LFO. The amount sweeps a band
    /// of width `amount * depth` centered on the amount.
    pub fn set_lfo(&mut self, rate_percentage: f32, depth: f32) -> &mut Self {
        let enabled = rate_percentage > 0.0;
        if enabled {
            self.lfo.set_rate(lfo_rate_hz(rate_percentage));
        }
        if enabled != self.lfo_enabled || depth != self.lfo_depth {
            self.lfo_enabled = enabled;
            self.lfo_depth = depth;
            self.cache_lfo();
        }
        self
    }

    /// Propagate a sample rate change to the LFO.
    pub fn set_sample_rate(&mut self, sr: f32) -> &mut Self {
        self.lfo.set_sample_rate(sr);
        self
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    /// Bit depth at the configured amount.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn output_mix(&self) -> f32 {
        self.output_mix
    }

    pub fn has_lfo(&self) -> bool {
        self.lfo_enabled
    }

    /// Modulation band as `(min, max)` amounts.
    pub fn lfo_bounds(&self) -> (f32, f32) {
        (self.lfo_min, self.lfo_max)
    }

    /// Whether processing would leave the signal untouched.
    pub fn is_transparent(&self) -> bool {
        self.amount >= 1.0 && !self.lfo_enabled
    }

    /// Rewind the LFO.
    pub fn reset(&mut self) {
        self.lfo.reset();
    }

    /// Crush a planar buffer of `buf.len() / frames` channels in place.
    pub fn process(&mut self, buf: &mut [f32], frames: usize) {
        if frames == 0 || self.is_transparent() {
            return;
        }
        let channels = buf.len() / frames;

        if !self.lfo_enabled {
            let steps = self.steps;
            for sample in buf[..channels * frames].iter_mut() {
                *sample = self.crush(*sample, steps);
            }
            return;
        }

        let range = self.lfo_max - self.lfo_min;
        for f in 0..frames {
            let amount = self.lfo_min + range * self.lfo.tick();
            let steps = steps_for(Self::bits_for(amount));
            for c in 0..channels {
                let idx = c * frames + f;
                buf[idx] = self.crush(buf[idx], steps);
            }
        }
    }

    #[inline]
    fn crush(&self, x: f32, steps: f32) -> f32 {
        let q = (x * self.input_mix * steps).round() / steps * self.output_mix;
        x * (1.0 - self.mix) + q * self.mix
    }

    fn cache_lfo(&mut self) {
        if !self.lfo_enabled {
            self.lfo_min = self.amount;
            self.lfo_max = self.amount;
            return;
        }
        let range = self.amount * self.lfo_depth;
        self.lfo_max = (self.amount + range * 0.5).min(1.0);
        self.lfo_min = (self.amount - range * 0.5).max(0.0);
    }
}

#[inline]
fn steps_for(bits: u32) -> f32 {
    (1u32 << (bits - 1)) as f32
}
