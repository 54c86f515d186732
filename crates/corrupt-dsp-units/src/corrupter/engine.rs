// SPDX-License-Identifier: LGPL-3.0-or-later

//! Corruption engine: record buffer, sample-and-hold playback and the
//! processing chain behind it.
//!
//! Every host frame is written into a circular [`RecordBuffer`] at an
//! integer write pointer. A fractional read pointer walks the same buffer
//! at the playback rate (1 = normal speed, down to [`MIN_PLAYBACK_SPEED`]),
//! and the value found there is held for `sample_incr` frames to emulate a
//! lower sample rate. There is no interpolation: the read position is
//! truncated and held samples are repeated verbatim, the stepping is the
//! effect.
//!
//! Per block:
//! ```text
//!   input ─┬─> record ─> hold ─> low-pass ─> bit crusher ─> limiter ─┬─> output
//!          └───────────────────────── dry ───────────────────────────┘
//! ```
//! The low-pass filter (and a sub-LSB dither on every fetch) is only
//! active while the downsample amount is above 1.
//!
//! # Silence
//!
//! When the first input channel of a block is entirely zero the block is
//! passed straight through (inputs copied, missing channels zeroed) without
//! touching the record buffer, the pointers or any processor state. Channels
//! are assumed to fall silent together.
//!
//! # Pointer resync
//!
//! Every rate setter checks whether a rate effect (downsampling, slowdown or
//! either LFO) was active before the call and none is after it. On that
//! transition the read pointer jumps to the write pointer, so switching the
//! effect off does not keep replaying audio from far behind.

use corrupt_dsp_lib::copy::{copy, fill_zero, from_f32, is_silent, to_f32};
use corrupt_dsp_lib::mix::mix2;
use corrupt_dsp_lib::sample::Sample;
use corrupt_dsp_lib::types::Df1Coeffs;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::consts::{
    DITHER_DC_OFFSET, DITHER_WI, MIN_DENOMINATOR, MIN_PLAYBACK_SPEED, MIN_SAMPLE_RATE,
};
use crate::dynamics::limiter::Limiter;
use crate::filters::lowpass::LowPassFilter;
use crate::misc::bitcrusher::BitCrusher;
use crate::misc::lfo::Lfo;
use crate::units::lfo_rate_hz;
use crate::util::record_buffer::RecordBuffer;

/// Block size assumed until the host reports one.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

const DITHER_SEED: u64 = 0x5EED_D17E;

// Output limiter: fast attack, slow release, +4 dB hard knee.
const LIMITER_ATTACK_MICROS: f32 = 10.0;
const LIMITER_RELEASE_MILLIS: f32 = 500.0;
const LIMITER_THRESHOLD: f32 = 0.6;

/// Hold length (in frames) for a downsample amount.
#[inline]
pub fn hold_length(downsample_amount: f32) -> usize {
    (downsample_amount.floor() as usize).max(1)
}

/// LFO sweeping a control between two bounds.
#[derive(Debug, Clone)]
struct Modulation {
    lfo: Lfo,
    enabled: bool,
    depth: f32,
    min: f32,
    max: f32,
}

impl Modulation {
    fn new(sample_rate: f32, center: f32) -> Self {
        Self {
            lfo: Lfo::new(sample_rate),
            enabled: false,
            depth: 0.0,
            min: center,
            max: center,
        }
    }

    /// Apply rate and depth. Returns whether the enabled state or the depth
    /// changed, i.e. whether the bounds need recomputing.
    fn configure(&mut self, rate_percentage: f32, depth: f32) -> bool {
        let enabled = rate_percentage > 0.0;
        if enabled {
            self.lfo.set_rate(lfo_rate_hz(rate_percentage));
        }
        let changed = enabled != self.enabled || depth != self.depth;
        self.enabled = enabled;
        self.depth = depth;
        changed
    }

    /// Center the band on `center`, `center * depth` wide, within `[floor, ceil]`.
    fn set_band(&mut self, center: f32, floor: f32, ceil: f32) {
        if !self.enabled {
            self.min = center;
            self.max = center;
            return;
        }
        let range = center * self.depth;
        self.max = (center + range * 0.5).min(ceil);
        self.min = (center - range * 0.5).max(floor);
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.min + (self.max - self.min) * self.lfo.tick()
    }
}

/// Snapshot of every value the setters derive, for comparison and metering.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedState {
    pub downsample_target: f32,
    pub downsample_amount: f32,
    pub sample_incr: usize,
    pub filter_ratio: f32,
    pub filter_coeffs: Df1Coeffs,
    pub resample_lfo_bounds: (f32, f32),
    pub playback_target: f32,
    pub playback_rate: f32,
    pub playback_lfo_bounds: (f32, f32),
    pub bits: u32,
    pub bit_crush_lfo_bounds: (f32, f32),
    pub bit_crush_output_mix: f32,
    pub dry_mix: f32,
    pub wet_mix: f32,
}

/// Sample-rate, bit-depth and playback-speed corruption engine.
///
/// # Examples
///
/// ```
/// use corrupt_dsp_units::corrupter::engine::Engine;
///
/// let mut engine = Engine::new(1, 44100.0);
/// engine.set_resample_rate(0.0);
/// assert_eq!(engine.sample_incr(), 44);
///
/// let input = vec![0.5f32; 128];
/// let mut output = vec![0.0f32; 128];
/// engine.process(&[&input[..]], &mut [&mut output[..]], 128);
/// ```
#[derive(Debug)]
pub struct Engine {
    sample_rate: f32,
    channels: usize,
    max_block_size: usize,

    record: RecordBuffer,
    dry: Vec<f32>,
    wet: Vec<f32>,
    held: Vec<f32>,
    last: Vec<f32>,
    write_pointer: usize,
    read_pointer: f64,
    hold_counter: usize,

    filters: Vec<LowPassFilter>,
    filter_ratio: f32,
    bit_crusher: BitCrusher,
    limiter: Limiter,
    rng: ChaCha8Rng,

    // downsampling
    max_downsample: f32,
    resample_rate: f32,
    downsample_target: f32,
    downsample_amount: f32,
    sample_incr: usize,
    resample_mod: Modulation,

    // playback speed
    playback_target: f32,
    playback_rate: f32,
    playback_mod: Modulation,

    dry_mix: f32,
    wet_mix: f32,
}

impl Engine {
    /// Create an engine for `channels` channels at `sample_rate` Hz, with
    /// buffers sized for [`DEFAULT_BLOCK_SIZE`].
    pub fn new(channels: usize, sample_rate: f32) -> Self {
        let mut engine = Self {
            sample_rate,
            channels: 0,
            max_block_size: 0,
            record: RecordBuffer::new(),
            dry: Vec::new(),
            wet: Vec::new(),
            held: Vec::new(),
            last: Vec::new(),
            write_pointer: 0,
            read_pointer: 0.0,
            hold_counter: 0,
            filters: Vec::new(),
            filter_ratio: 1.0,
            bit_crusher: BitCrusher::new(sample_rate),
            limiter: Limiter::with_units(
                sample_rate,
                LIMITER_ATTACK_MICROS,
                LIMITER_RELEASE_MILLIS,
                LIMITER_THRESHOLD,
                false,
            ),
            rng: ChaCha8Rng::seed_from_u64(DITHER_SEED),
            max_downsample: max_downsample(sample_rate),
            resample_rate: 1.0,
            downsample_target: 1.0,
            downsample_amount: 1.0,
            sample_incr: 1,
            resample_mod: Modulation::new(sample_rate, 0.0),
            playback_target: 1.0,
            playback_rate: 1.0,
            playback_mod: Modulation::new(sample_rate, 1.0),
            dry_mix: 0.0,
            wet_mix: 1.0,
        };
        engine.cache_downsampling();
        engine.cache_resample_lfo();
        engine.prepare(channels, DEFAULT_BLOCK_SIZE);
        engine
    }

    /// Size every buffer for `channels` channels and blocks of up to
    /// `max_block_size` frames.
    ///
    /// This is the only place that allocates. It clears the record buffer
    /// and zeroes both pointers.
    pub fn prepare(&mut self, channels: usize, max_block_size: usize) {
        let channels = channels.max(1);
        let max_block_size = max_block_size.max(1);

        self.channels = channels;
        self.max_block_size = max_block_size;
        self.record.init(channels, self.sample_rate, max_block_size);

        let len = channels * max_block_size;
        self.dry.clear();
        self.dry.resize(len, 0.0);
        self.wet.clear();
        self.wet.resize(len, 0.0);
        self.held.clear();
        self.held.resize(channels, 0.0);
        self.last.clear();
        self.last.resize(channels, 0.0);

        self.filters.resize_with(channels, LowPassFilter::new);
        self.apply_filter_ratio();
        self.reset_read_write_pointers();

        log::debug!(
            "record buffer: {} channels x {} frames ({} frames per block)",
            channels,
            self.record.frames(),
            max_block_size
        );
    }

    /// Notify the engine of a new host sample rate.
    ///
    /// Re-derives the downsample ceiling from the current resample control,
    /// the LFO increments and the limiter time constants, and reallocates the
    /// record buffer for the new rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        log::info!("sample rate changed: {} -> {} Hz", self.sample_rate, sample_rate);

        self.sample_rate = sample_rate;
        self.max_downsample = max_downsample(sample_rate);
        self.resample_mod.lfo.set_sample_rate(sample_rate);
        self.playback_mod.lfo.set_sample_rate(sample_rate);
        self.bit_crusher.set_sample_rate(sample_rate);
        self.limiter.set_sample_rate(sample_rate);

        self.downsample_target = scaled_downsample(self.resample_rate, self.max_downsample);
        self.downsample_amount = self.downsample_target;
        self.cache_downsampling();
        self.cache_resample_lfo();

        self.prepare(self.channels, self.max_block_size);
    }

    /// Set the resample control (1 = host rate, 0 = [`MIN_SAMPLE_RATE`]).
    ///
    /// While the resample LFO runs, the applied amount is rescaled by the
    /// same ratio as the target so the modulation keeps its relative
    /// position. Nothing is recomputed when the derived target is unchanged.
    pub fn set_resample_rate(&mut self, value: f32) {
        self.resample_rate = value;
        let scaled = scaled_downsample(value, self.max_downsample);
        if scaled == self.downsample_target {
            return;
        }
        let was = self.is_rate_altered();

        let ratio = self.downsample_amount / self.downsample_target.max(MIN_DENOMINATOR);
        self.downsample_target = scaled;
        self.downsample_amount = if self.resample_mod.enabled {
            (scaled * ratio).max(1.0)
        } else {
            scaled
        };
        self.cache_downsampling();
        self.cache_resample_lfo();
        self.resync_if_idle(was);
    }

    /// Configure the LFO sweeping the downsample amount.
    ///
    /// A zero `rate_percentage` disables it and snaps the amount back to the
    /// target.
    pub fn set_resample_lfo(&mut self, rate_percentage: f32, depth: f32) {
        let was = self.is_rate_altered();
        let changed = self.resample_mod.configure(rate_percentage, depth);

        if !self.resample_mod.enabled && self.downsample_amount != self.downsample_target {
            self.downsample_amount = self.downsample_target;
            self.cache_downsampling();
        }
        if changed {
            self.cache_resample_lfo();
        }
        self.resync_if_idle(was);
    }

    /// Set the playback control (1 = normal speed, 0 = [`MIN_PLAYBACK_SPEED`]).
    pub fn set_playback_rate(&mut self, value: f32) {
        let scaled = value.clamp(0.0, 1.0) * (1.0 - MIN_PLAYBACK_SPEED) + MIN_PLAYBACK_SPEED;
        if scaled == self.playback_target {
            return;
        }
        let was = self.is_rate_altered();

        let ratio = self.playback_rate / self.playback_target.max(MIN_DENOMINATOR);
        self.playback_target = scaled;
        self.playback_rate = if self.playback_mod.enabled {
            (scaled * ratio).clamp(MIN_PLAYBACK_SPEED, 1.0)
        } else {
            scaled
        };
        self.cache_playback_lfo();
        self.resync_if_idle(was);
    }

    /// Configure the LFO sweeping the playback rate.
    pub fn set_playback_rate_lfo(&mut self, rate_percentage: f32, depth: f32) {
        let was = self.is_rate_altered();
        let changed = self.playback_mod.configure(rate_percentage, depth);

        if !self.playback_mod.enabled {
            self.playback_rate = self.playback_target;
        }
        if changed {
            self.cache_playback_lfo();
        }
        self.resync_if_idle(was);
    }

    pub fn set_dry_mix(&mut self, value: f32) {
        self.dry_mix = value;
    }

    pub fn set_wet_mix(&mut self, value: f32) {
        self.wet_mix = value;
    }

    /// Move both pointers to the start of the record buffer.
    pub fn reset_read_write_pointers(&mut self) {
        self.write_pointer = 0;
        self.read_pointer = 0.0;
        self.hold_counter = 0;
    }

    /// Silence the record buffer and the held samples.
    pub fn clear_buffer(&mut self) {
        self.record.clear();
        self.held.fill(0.0);
        self.last.fill(0.0);
    }

    /// Zero the history of every low-pass filter.
    pub fn reset_filters(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }

    /// Process one block.
    ///
    /// `output.len()` sets the channel count; output channels without a
    /// matching input channel are fed, for the whole block, the last sample
    /// written to that output by the previous block. Buffers
    /// are resized first if the channel count or block size grew.
    ///
    /// # Panics
    /// Panics if any buffer is shorter than `block_size`.
    pub fn process<S: Sample>(&mut self, input: &[&[S]], output: &mut [&mut [S]], block_size: usize) {
        let channels = output.len();
        if block_size == 0 || channels == 0 {
            return;
        }
        if channels != self.channels || block_size > self.max_block_size {
            self.prepare(channels, block_size.max(self.max_block_size));
        }

        if input.first().is_none_or(|ch| is_silent(&ch[..block_size])) {
            for (c, out) in output.iter_mut().enumerate() {
                match input.get(c) {
                    Some(inp) => copy(&mut out[..block_size], &inp[..block_size]),
                    None => fill_zero(&mut out[..block_size]),
                }
            }
            return;
        }

        let frames = block_size;
        let len = channels * frames;
        let inputs = input.len().min(channels);
        for (c, inp) in input.iter().take(inputs).enumerate() {
            to_f32(&mut self.dry[c * frames..(c + 1) * frames], &inp[..frames]);
        }

        let record_frames = self.record.frames();
        for f in 0..frames {
            if self.resample_mod.enabled {
                self.tick_resample_lfo();
            }
            if self.playback_mod.enabled {
                self.playback_rate = self.playback_mod.next();
            }

            let downsampled = self.is_downsampled();
            let fetch = self.sample_incr == 1 || self.hold_counter == 0;
            let read_pos = self.read_pointer as usize;

            for c in 0..channels {
                let idx = c * frames + f;
                let x = if c < inputs {
                    self.dry[idx]
                } else {
                    self.dry[idx] = self.last[c];
                    self.last[c]
                };
                self.record.write(c, self.write_pointer, x);

                if fetch {
                    let mut v = self.record.read(c, read_pos);
                    if downsampled {
                        v += self.rng.random::<f32>() * DITHER_WI - DITHER_DC_OFFSET;
                    }
                    self.held[c] = v;
                }
                self.wet[idx] = if downsampled {
                    self.filters[c].apply_single(self.held[c])
                } else {
                    self.held[c]
                };
            }

            self.write_pointer += 1;
            if self.write_pointer >= record_frames {
                self.write_pointer = 0;
            }
            self.hold_counter += 1;
            if self.hold_counter >= self.sample_incr {
                self.hold_counter = 0;
            }
            self.read_pointer += self.playback_rate as f64;
            if self.read_pointer >= record_frames as f64 {
                self.read_pointer -= record_frames as f64;
            }
        }

        let wet = &mut self.wet[..len];
        self.bit_crusher.process(wet, frames);
        self.limiter.process(wet, frames);
        mix2(wet, &self.dry[..len], self.wet_mix, self.dry_mix);

        for (c, out) in output.iter_mut().enumerate() {
            let emitted = &self.wet[c * frames..(c + 1) * frames];
            self.last[c] = emitted[frames - 1];
            from_f32(&mut out[..frames], emitted);
        }
    }

    /// Whether samples are currently held for more than one frame.
    pub fn is_downsampled(&self) -> bool {
        self.downsample_amount > 1.0
    }

    /// Whether any rate effect or rate LFO is active.
    pub fn is_rate_altered(&self) -> bool {
        self.downsample_target > 1.0
            || self.resample_mod.enabled
            || self.playback_target < 1.0
            || self.playback_mod.enabled
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Largest downsample amount at the current sample rate.
    pub fn max_downsample(&self) -> f32 {
        self.max_downsample
    }

    pub fn downsample_target(&self) -> f32 {
        self.downsample_target
    }

    /// Downsample amount currently applied.
    pub fn downsample_amount(&self) -> f32 {
        self.downsample_amount
    }

    /// Number of frames each fetched sample is held for, always `>= 1`.
    pub fn sample_incr(&self) -> usize {
        self.sample_incr
    }

    /// Resample LFO band, in downsample amounts.
    pub fn resample_lfo_bounds(&self) -> (f32, f32) {
        (
            self.resample_mod.min * self.max_downsample,
            self.resample_mod.max * self.max_downsample,
        )
    }

    pub fn playback_target(&self) -> f32 {
        self.playback_target
    }

    /// Playback rate currently applied.
    pub fn playback_rate(&self) -> f32 {
        self.playback_rate
    }

    pub fn playback_lfo_bounds(&self) -> (f32, f32) {
        (self.playback_mod.min, self.playback_mod.max)
    }

    pub fn dry_mix(&self) -> f32 {
        self.dry_mix
    }

    pub fn wet_mix(&self) -> f32 {
        self.wet_mix
    }

    pub fn write_pointer(&self) -> usize {
        self.write_pointer
    }

    pub fn read_pointer(&self) -> f64 {
        self.read_pointer
    }

    pub fn record_buffer(&self) -> &RecordBuffer {
        &self.record
    }

    /// Cutoff ratio shared by every channel's low-pass filter.
    pub fn filter_ratio(&self) -> f32 {
        self.filter_ratio
    }

    pub fn filter(&self, channel: usize) -> Option<&LowPassFilter> {
        self.filters.get(channel)
    }

    pub fn bit_crusher(&self) -> &BitCrusher {
        &self.bit_crusher
    }

    pub fn bit_crusher_mut(&mut self) -> &mut BitCrusher {
        &mut self.bit_crusher
    }

    pub fn limiter(&self) -> &Limiter {
        &self.limiter
    }

    pub fn limiter_mut(&mut self) -> &mut Limiter {
        &mut self.limiter
    }

    /// Snapshot of the derived values.
    pub fn cached_state(&self) -> CachedState {
        CachedState {
            downsample_target: self.downsample_target,
            downsample_amount: self.downsample_amount,
            sample_incr: self.sample_incr,
            filter_ratio: self.filter_ratio,
            filter_coeffs: self
                .filters
                .first()
                .map(|f| *f.coeffs())
                .unwrap_or_default(),
            resample_lfo_bounds: self.resample_lfo_bounds(),
            playback_target: self.playback_target,
            playback_rate: self.playback_rate,
            playback_lfo_bounds: self.playback_lfo_bounds(),
            bits: self.bit_crusher.bits(),
            bit_crush_lfo_bounds: self.bit_crusher.lfo_bounds(),
            bit_crush_output_mix: self.bit_crusher.output_mix(),
            dry_mix: self.dry_mix,
            wet_mix: self.wet_mix,
        }
    }

    fn tick_resample_lfo(&mut self) {
        self.downsample_amount = (self.resample_mod.next() * self.max_downsample).max(1.0);
        let incr = hold_length(self.downsample_amount);
        if incr != self.sample_incr {
            self.sample_incr = incr;
            self.filter_ratio = 1.0 + self.downsample_amount / self.max_downsample;
            self.apply_filter_ratio();
        }
    }

    fn cache_downsampling(&mut self) {
        self.sample_incr = hold_length(self.downsample_amount);
        self.filter_ratio = 1.0 + self.downsample_amount / self.max_downsample;
        self.apply_filter_ratio();
    }

    fn apply_filter_ratio(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.set_ratio(self.filter_ratio);
        }
    }

    fn cache_resample_lfo(&mut self) {
        let center = self.downsample_target / self.max_downsample;
        self.resample_mod.set_band(center, 0.0, 1.0);
    }

    fn cache_playback_lfo(&mut self) {
        self.playback_mod
            .set_band(self.playback_target, MIN_PLAYBACK_SPEED, 1.0);
    }

    fn resync_if_idle(&mut self, was_altered: bool) {
        if was_altered && !self.is_rate_altered() {
            self.read_pointer = self.write_pointer as f64;
            self.hold_counter = 0;
            log::debug!("rate effects off, read pointer resynced to {}", self.write_pointer);
        }
    }
}

/// Downsample ceiling for a sample rate, never below 1.
fn max_downsample(sample_rate: f32) -> f32 {
    (sample_rate / MIN_SAMPLE_RATE).max(1.0)
}

/// Downsample target for a resample control value.
fn scaled_downsample(value: f32, max_downsample: f32) -> f32 {
    (value - 1.0).abs().min(1.0) * (max_downsample - 1.0) + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn run(engine: &mut Engine, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0f32; input.len()];
        engine.process(&[input], &mut [&mut output[..]], input.len());
        output
    }

    #[test]
    fn test_hold_length() {
        assert_eq!(hold_length(1.0), 1);
        assert_eq!(hold_length(0.2), 1);
        assert_eq!(hold_length(44.1), 44);
        assert_eq!(hold_length(f32::NAN), 1);
    }

    #[test]
    fn test_scaled_downsample() {
        assert_eq!(scaled_downsample(1.0, 44.1), 1.0);
        assert_approx_eq!(f32, scaled_downsample(0.0, 44.1), 44.1, ulps = 2);
        assert_approx_eq!(f32, scaled_downsample(-4.0, 44.1), 44.1, ulps = 2);
    }

    #[test]
    fn test_defaults() {
        let engine = Engine::new(2, 48000.0);
        assert_eq!(engine.sample_incr(), 1);
        assert!(!engine.is_downsampled());
        assert!(!engine.is_rate_altered());
        assert_eq!(engine.playback_rate(), 1.0);
        assert_approx_eq!(f32, engine.max_downsample(), 48.0, ulps = 1);
        assert_approx_eq!(f32, engine.filter_ratio(), 1.0 + 1.0 / 48.0, ulps = 2);
    }

    #[test]
    fn test_set_resample_rate_is_noop_when_unchanged() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_resample_rate(0.5);
        let before = engine.cached_state();
        engine.set_resample_rate(0.5);
        assert_eq!(engine.cached_state(), before);
    }

    #[test]
    fn test_resample_rescale_keeps_lfo_ratio() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_resample_rate(0.5);
        engine.set_resample_lfo(0.5, 1.0);
        let _ = run(&mut engine, &[0.25f32; 100]);
        let ratio = engine.downsample_amount() / engine.downsample_target();

        engine.set_resample_rate(0.2);
        let new_ratio = engine.downsample_amount() / engine.downsample_target();
        assert_approx_eq!(f32, new_ratio, ratio, epsilon = 1e-4);
    }

    #[test]
    fn test_playback_range() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_playback_rate(0.0);
        assert_eq!(engine.playback_rate(), MIN_PLAYBACK_SPEED);
        engine.set_playback_rate(1.0);
        assert_eq!(engine.playback_rate(), 1.0);
        engine.set_playback_rate(0.5);
        assert_approx_eq!(f32, engine.playback_rate(), 0.75, ulps = 1);
    }

    #[test]
    fn test_playback_lfo_band() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_playback_rate_lfo(0.3, 1.0);
        assert_eq!(engine.playback_lfo_bounds(), (MIN_PLAYBACK_SPEED, 1.0));

        let _ = run(&mut engine, &[0.1f32; 4096]);
        let rate = engine.playback_rate();
        assert!((MIN_PLAYBACK_SPEED..=1.0).contains(&rate));

        engine.set_playback_rate_lfo(0.0, 1.0);
        assert_eq!(engine.playback_rate(), 1.0);
        assert_eq!(engine.playback_lfo_bounds(), (1.0, 1.0));
    }

    #[test]
    fn test_resample_lfo_keeps_hold_length_valid() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_resample_rate(0.3);
        engine.set_resample_lfo(1.0, 1.0);
        let (min, max) = engine.resample_lfo_bounds();
        assert!(min < max);
        for _ in 0..20 {
            let _ = run(&mut engine, &[0.5f32; 256]);
            assert!(engine.sample_incr() >= 1);
            assert!(engine.downsample_amount() >= 1.0);
            assert!(engine.downsample_amount() <= max + 1e-3);
        }
    }

    #[test]
    fn test_disabling_lfo_snaps_to_target() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_resample_rate(0.5);
        engine.set_resample_lfo(0.8, 0.6);
        let _ = run(&mut engine, &[0.5f32; 300]);
        engine.set_resample_lfo(0.0, 0.6);
        assert_eq!(engine.downsample_amount(), engine.downsample_target());
        assert_eq!(engine.sample_incr(), hold_length(engine.downsample_target()));
    }

    #[test]
    fn test_silent_block_passes_through() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_dry_mix(0.5);
        let out = run(&mut engine, &[0.0f32; 64]);
        assert!(out.iter().all(|&v| v == 0.0));
        assert_eq!(engine.write_pointer(), 0);
    }

    #[test]
    fn test_missing_input_channel_repeats_last_sample() {
        let mut engine = Engine::new(2, 44100.0);
        let input = vec![0.5f32; 32];
        let mut left = vec![0.0f32; 32];
        let mut right = vec![1.0f32; 32];
        engine.process(&[&input[..]], &mut [&mut left[..], &mut right[..]], 32);
        assert_eq!(left, input);
        assert!(right.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_missing_input_channel_is_fed_mixed_output() {
        let mut engine = Engine::new(2, 44100.0);
        engine.set_wet_mix(0.5);
        let left_in = vec![0.6f32; 32];
        let right_in = vec![0.8f32; 32];
        let mut left = vec![0.0f32; 32];
        let mut right = vec![0.0f32; 32];

        engine.process(&[&left_in[..], &right_in[..]], &mut [&mut left[..], &mut right[..]], 32);
        assert_approx_eq!(f32, right[31], 0.4, ulps = 2);

        // Right input gone: the 0.4 it last emitted is fed back and halved.
        engine.process(&[&left_in[..]], &mut [&mut left[..], &mut right[..]], 32);
        for &v in right.iter() {
            assert_approx_eq!(f32, v, 0.2, ulps = 2);
        }
    }

    #[test]
    fn test_process_grows_buffers() {
        let mut engine = Engine::new(1, 44100.0);
        let input = vec![0.25f32; DEFAULT_BLOCK_SIZE * 2];
        let out = run(&mut engine, &input);
        assert_eq!(engine.max_block_size(), DEFAULT_BLOCK_SIZE * 2);
        assert_eq!(out, input);
    }

    #[test]
    fn test_set_sample_rate_recaches() {
        let mut engine = Engine::new(1, 44100.0);
        engine.set_resample_rate(0.0);
        assert_eq!(engine.sample_incr(), 44);
        engine.set_sample_rate(96000.0);
        assert_approx_eq!(f32, engine.max_downsample(), 96.0, ulps = 1);
        assert_eq!(engine.sample_incr(), 96);
        assert_eq!(engine.record_buffer().frames() % DEFAULT_BLOCK_SIZE, 0);
    }
}
