// SPDX-License-Identifier: LGPL-3.0-or-later

//! Host-agnostic processor: controls, transport, bypass and state around an
//! [`Engine`].
//!
//! Control changes are collected with [`Processor::set_control`] and pushed
//! into the engine at the start of the next non-bypassed block, always in
//! the same order, so restoring a state replays exactly the setter sequence
//! a live session would have produced.

use corrupt_dsp_lib::copy::{copy, fill_zero};
use corrupt_dsp_lib::sample::Sample;

use crate::corrupter::controls::{Controls, ParamId, STATE_SIZE, StateError};
use crate::corrupter::engine::Engine;
use crate::misc::bitcrusher::BitCrusher;
use crate::units::gain_to_db;

/// Engine wrapper exposing the host-facing surface.
///
/// # Examples
///
/// ```
/// use corrupt_dsp_units::corrupter::controls::ParamId;
/// use corrupt_dsp_units::corrupter::processor::Processor;
///
/// let mut p = Processor::new(2, 48000.0);
/// p.set_control(ParamId::BitDepth, 0.25);
/// p.set_playing(true);
///
/// let left = vec![0.5f64; 64];
/// let right = vec![-0.5f64; 64];
/// let mut out_l = vec![0.0f64; 64];
/// let mut out_r = vec![0.0f64; 64];
/// p.process(&[&left[..], &right[..]], &mut [&mut out_l[..], &mut out_r[..]], 64);
/// assert!(p.gain_reduction() <= 1.0);
/// ```
#[derive(Debug)]
pub struct Processor {
    engine: Engine,
    controls: Controls,
    dirty: bool,
    playing: bool,
    gain_reduction: f32,
}

impl Processor {
    /// Create a processor with default controls already applied.
    pub fn new(channels: usize, sample_rate: f32) -> Self {
        let mut processor = Self {
            engine: Engine::new(channels, sample_rate),
            controls: Controls::default(),
            dirty: false,
            playing: false,
            gain_reduction: 1.0,
        };
        processor.apply_controls();
        processor
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    /// Queue a control change for the next block.
    pub fn set_control(&mut self, id: ParamId, value: f32) {
        self.controls.set(id, value);
        self.dirty = true;
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.controls.bypass = bypass;
    }

    pub fn is_bypassed(&self) -> bool {
        self.controls.bypass
    }

    /// Replace every control and apply them immediately.
    pub fn set_controls(&mut self, controls: Controls) {
        self.controls = controls;
        self.apply_controls();
    }

    /// Push the control snapshot into the engine.
    pub fn apply_controls(&mut self) {
        let c = self.controls;
        let engine = &mut self.engine;

        engine.set_resample_rate(c.resample_rate);
        engine.bit_crusher_mut().set_amount(c.bit_depth);
        engine.set_playback_rate(c.playback_rate);
        engine
            .bit_crusher_mut()
            .set_output_mix(BitCrusher::makeup_gain(c.bit_depth));
        engine.set_resample_lfo(c.resample_lfo, c.resample_lfo_depth);
        engine.set_playback_rate_lfo(c.playback_rate_lfo, c.playback_rate_lfo_depth);
        engine
            .bit_crusher_mut()
            .set_lfo(c.bit_crush_lfo, c.bit_crush_lfo_depth);
        engine.set_dry_mix(c.dry_mix);
        engine.set_wet_mix(c.wet_mix);

        self.dirty = false;
    }

    /// Report the host transport state.
    ///
    /// Any start/stop edge silences the record buffer and the filters; a
    /// start also rewinds both pointers.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.playing {
            return;
        }
        if playing {
            self.engine.reset_read_write_pointers();
        }
        self.engine.clear_buffer();
        self.engine.reset_filters();
        self.playing = playing;
        log::debug!("transport {}", if playing { "started" } else { "stopped" });
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.engine.set_sample_rate(sample_rate);
    }

    /// Linear gain reduction of the last processed block, in (0, 1].
    pub fn gain_reduction(&self) -> f32 {
        self.gain_reduction
    }

    /// Gain reduction of the last processed block in dB (0 or negative).
    pub fn gain_reduction_db(&self) -> f32 {
        gain_to_db(self.gain_reduction)
    }

    /// Process one block.
    ///
    /// While bypassed the inputs are copied to the outputs (missing inputs
    /// become silence) and neither the engine nor pending controls are
    /// touched.
    pub fn process<S: Sample>(&mut self, input: &[&[S]], output: &mut [&mut [S]], block_size: usize) {
        if self.controls.bypass {
            for (c, out) in output.iter_mut().enumerate() {
                match input.get(c) {
                    Some(inp) => copy(&mut out[..block_size], &inp[..block_size]),
                    None => fill_zero(&mut out[..block_size]),
                }
            }
            return;
        }

        if self.dirty {
            self.apply_controls();
        }
        self.engine.process(input, output, block_size);
        self.gain_reduction = self.engine.limiter().linear_gr();
    }

    /// Serialize the controls.
    pub fn save_state(&self) -> [u8; STATE_SIZE] {
        self.controls.to_bytes()
    }

    /// Restore and apply controls from a saved state.
    ///
    /// On error the current controls are left untouched.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        match Controls::from_bytes(bytes) {
            Ok(controls) => {
                self.set_controls(controls);
                log::info!("state restored ({} bytes)", bytes.len());
                Ok(())
            }
            Err(e) => {
                log::warn!("state restore failed: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_transparent() {
        let mut p = Processor::new(1, 44100.0);
        let input: Vec<f32> = (0..128).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let mut output = vec![0.0f32; 128];
        p.process(&[&input[..]], &mut [&mut output[..]], 128);
        assert_eq!(output, input);
        assert_eq!(p.gain_reduction(), 1.0);
        assert_eq!(p.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_set_control_is_deferred() {
        let mut p = Processor::new(1, 44100.0);
        p.set_control(ParamId::ResampleRate, 0.0);
        assert_eq!(p.engine().sample_incr(), 1);

        let input = vec![0.1f32; 16];
        let mut output = vec![0.0f32; 16];
        p.process(&[&input[..]], &mut [&mut output[..]], 16);
        assert_eq!(p.engine().sample_incr(), 44);
    }

    #[test]
    fn test_bit_depth_sets_makeup_gain() {
        let mut p = Processor::new(1, 44100.0);
        let mut c = Controls::default();
        c.bit_depth = 0.2;
        p.set_controls(c);
        assert_eq!(p.engine().bit_crusher().output_mix(), 0.25);
        c.bit_depth = 0.8;
        p.set_controls(c);
        assert_eq!(p.engine().bit_crusher().output_mix(), 1.25);
        c.bit_depth = 1.0;
        p.set_controls(c);
        assert_eq!(p.engine().bit_crusher().output_mix(), 1.0);
    }

    #[test]
    fn test_transport_edges() {
        let mut p = Processor::new(1, 44100.0);
        let input = vec![0.3f32; 64];
        let mut output = vec![0.0f32; 64];
        p.set_playing(true);
        p.process(&[&input[..]], &mut [&mut output[..]], 64);
        assert_eq!(p.engine().write_pointer(), 64);

        // Repeated reports are not edges.
        p.set_playing(true);
        assert_eq!(p.engine().write_pointer(), 64);

        p.set_playing(false);
        assert!(p.engine().record_buffer().is_silent());
        assert!(!p.is_playing());
    }

    #[test]
    fn test_load_state_error_keeps_controls() {
        let mut p = Processor::new(1, 44100.0);
        p.set_control(ParamId::WetMix, 0.3);
        assert!(p.load_state(&[0u8; 12]).is_err());
        assert_eq!(p.controls().wet_mix, 0.3);
    }
}
