// SPDX-License-Identifier: LGPL-3.0-or-later

//! Host-facing control set and its persisted byte layout.
//!
//! Every control is a normalized `f32` in [0, 1]. The persisted state is the
//! eleven controls in [`ParamId::ALL`] order followed by the bypass flag,
//! each field a little-endian 32-bit value (bypass as an `i32` 0/1):
//! ```text
//!   offset  0  resample rate
//!   offset  4  bit depth
//!   ...
//!   offset 40  dry mix
//!   offset 44  bypass
//! ```

use thiserror::Error;

use crate::consts::{MIN_PLAYBACK_SPEED, MIN_SAMPLE_RATE};
use crate::misc::bitcrusher::BitCrusher;
use crate::units::lfo_rate_hz;

/// Size of the persisted state in bytes.
pub const STATE_SIZE: usize = (ParamId::COUNT + 1) * 4;

/// Errors raised while restoring persisted state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("state truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("stored value for `{field}` is not finite")]
    NonFinite { field: &'static str },
}

/// Identifier of one normalized control, in persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    ResampleRate,
    BitDepth,
    PlaybackRate,
    ResampleLfo,
    ResampleLfoDepth,
    BitCrushLfo,
    BitCrushLfoDepth,
    PlaybackRateLfo,
    PlaybackRateLfoDepth,
    WetMix,
    DryMix,
}

impl ParamId {
    pub const COUNT: usize = 11;

    /// All controls in persisted order.
    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::ResampleRate,
        ParamId::BitDepth,
        ParamId::PlaybackRate,
        ParamId::ResampleLfo,
        ParamId::ResampleLfoDepth,
        ParamId::BitCrushLfo,
        ParamId::BitCrushLfoDepth,
        ParamId::PlaybackRateLfo,
        ParamId::PlaybackRateLfoDepth,
        ParamId::WetMix,
        ParamId::DryMix,
    ];

    /// Stable identifier, used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            ParamId::ResampleRate => "resample_rate",
            ParamId::BitDepth => "bit_depth",
            ParamId::PlaybackRate => "playback_rate",
            ParamId::ResampleLfo => "resample_lfo",
            ParamId::ResampleLfoDepth => "resample_lfo_depth",
            ParamId::BitCrushLfo => "bit_crush_lfo",
            ParamId::BitCrushLfoDepth => "bit_crush_lfo_depth",
            ParamId::PlaybackRateLfo => "playback_rate_lfo",
            ParamId::PlaybackRateLfoDepth => "playback_rate_lfo_depth",
            ParamId::WetMix => "wet_mix",
            ParamId::DryMix => "dry_mix",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            ParamId::ResampleRate => "Resampling rate",
            ParamId::BitDepth => "Resolution",
            ParamId::PlaybackRate => "Playback rate",
            ParamId::ResampleLfo => "Resampling LFO",
            ParamId::ResampleLfoDepth => "Resampling LFO depth",
            ParamId::BitCrushLfo => "Bit crush LFO",
            ParamId::BitCrushLfoDepth => "Bit crush LFO depth",
            ParamId::PlaybackRateLfo => "Playback LFO",
            ParamId::PlaybackRateLfoDepth => "Playback LFO depth",
            ParamId::WetMix => "Wet mix",
            ParamId::DryMix => "Dry mix",
        }
    }

    /// Format a normalized value the way a host shows it.
    ///
    /// # Arguments
    /// * `value` - Normalized control value
    /// * `sample_rate` - Host sample rate in Hz, used by the resample rate
    pub fn display(self, value: f32, sample_rate: f32) -> String {
        match self {
            ParamId::ResampleRate => {
                let hz = ((sample_rate - MIN_SAMPLE_RATE) * value) as i32 + MIN_SAMPLE_RATE as i32;
                format!("{hz} Hz")
            }
            ParamId::BitDepth => format!("{} Bits", BitCrusher::bits_for(value)),
            ParamId::PlaybackRate => {
                let pct = MIN_PLAYBACK_SPEED * 100.0;
                format!("{} %", (value * pct + pct) as i32)
            }
            ParamId::ResampleLfo | ParamId::BitCrushLfo | ParamId::PlaybackRateLfo => {
                let hz = if value > 0.0 { lfo_rate_hz(value) } else { 0.0 };
                format!("{hz:.2} Hz")
            }
            ParamId::ResampleLfoDepth
            | ParamId::BitCrushLfoDepth
            | ParamId::PlaybackRateLfoDepth
            | ParamId::WetMix
            | ParamId::DryMix => format!("{} %", (value * 100.0) as i32),
        }
    }
}

/// Snapshot of every host control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    pub resample_rate: f32,
    pub bit_depth: f32,
    pub playback_rate: f32,
    pub resample_lfo: f32,
    pub resample_lfo_depth: f32,
    pub bit_crush_lfo: f32,
    pub bit_crush_lfo_depth: f32,
    pub playback_rate_lfo: f32,
    pub playback_rate_lfo_depth: f32,
    pub wet_mix: f32,
    pub dry_mix: f32,
    pub bypass: bool,
}

impl Default for Controls {
    /// Everything off: full rate, full resolution, normal speed, wet only.
    fn default() -> Self {
        Self {
            resample_rate: 1.0,
            bit_depth: 1.0,
            playback_rate: 1.0,
            resample_lfo: 0.0,
            resample_lfo_depth: 0.0,
            bit_crush_lfo: 0.0,
            bit_crush_lfo_depth: 0.0,
            playback_rate_lfo: 0.0,
            playback_rate_lfo_depth: 0.0,
            wet_mix: 1.0,
            dry_mix: 0.0,
            bypass: false,
        }
    }
}

impl Controls {
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::ResampleRate => self.resample_rate,
            ParamId::BitDepth => self.bit_depth,
            ParamId::PlaybackRate => self.playback_rate,
            ParamId::ResampleLfo => self.resample_lfo,
            ParamId::ResampleLfoDepth => self.resample_lfo_depth,
            ParamId::BitCrushLfo => self.bit_crush_lfo,
            ParamId::BitCrushLfoDepth => self.bit_crush_lfo_depth,
            ParamId::PlaybackRateLfo => self.playback_rate_lfo,
            ParamId::PlaybackRateLfoDepth => self.playback_rate_lfo_depth,
            ParamId::WetMix => self.wet_mix,
            ParamId::DryMix => self.dry_mix,
        }
    }

    pub fn set(&mut self, id: ParamId, value: f32) {
        let slot = match id {
            ParamId::ResampleRate => &mut self.resample_rate,
            ParamId::BitDepth => &mut self.bit_depth,
            ParamId::PlaybackRate => &mut self.playback_rate,
            ParamId::ResampleLfo => &mut self.resample_lfo,
            ParamId::ResampleLfoDepth => &mut self.resample_lfo_depth,
            ParamId::BitCrushLfo => &mut self.bit_crush_lfo,
            ParamId::BitCrushLfoDepth => &mut self.bit_crush_lfo_depth,
            ParamId::PlaybackRateLfo => &mut self.playback_rate_lfo,
            ParamId::PlaybackRateLfoDepth => &mut self.playback_rate_lfo_depth,
            ParamId::WetMix => &mut self.wet_mix,
            ParamId::DryMix => &mut self.dry_mix,
        };
        *slot = value;
    }

    /// Serialize into the fixed little-endian layout.
    pub fn to_bytes(&self) -> [u8; STATE_SIZE] {
        let mut out = [0u8; STATE_SIZE];
        for (i, id) in ParamId::ALL.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&self.get(*id).to_le_bytes());
        }
        let bypass = i32::from(self.bypass);
        out[ParamId::COUNT * 4..].copy_from_slice(&bypass.to_le_bytes());
        out
    }

    /// Restore from the fixed little-endian layout.
    ///
    /// Trailing bytes beyond [`STATE_SIZE`] are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateError> {
        if bytes.len() < STATE_SIZE {
            return Err(StateError::Truncated {
                expected: STATE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut controls = Self::default();
        for (id, chunk) in ParamId::ALL.iter().zip(bytes.chunks_exact(4)) {
            let value = f32::from_le_bytes(word(chunk));
            if !value.is_finite() {
                return Err(StateError::NonFinite { field: id.name() });
            }
            controls.set(*id, value);
        }
        let offset = ParamId::COUNT * 4;
        controls.bypass = i32::from_le_bytes(word(&bytes[offset..offset + 4])) != 0;
        Ok(controls)
    }
}

fn word(chunk: &[u8]) -> [u8; 4] {
    let mut w = [0u8; 4];
    w.copy_from_slice(chunk);
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_size() {
        assert_eq!(STATE_SIZE, 48);
    }

    #[test]
    fn test_get_set_cover_every_param() {
        let mut c = Controls::default();
        for (i, id) in ParamId::ALL.iter().enumerate() {
            c.set(*id, i as f32 / 16.0);
        }
        for (i, id) in ParamId::ALL.iter().enumerate() {
            assert_eq!(c.get(*id), i as f32 / 16.0, "{}", id.name());
        }
    }

    #[test]
    fn test_byte_layout() {
        let c = Controls {
            resample_rate: 0.25,
            dry_mix: 0.5,
            bypass: true,
            ..Default::default()
        };
        let bytes = c.to_bytes();
        assert_eq!(bytes[0..4], 0.25f32.to_le_bytes());
        assert_eq!(bytes[4..8], 1.0f32.to_le_bytes());
        assert_eq!(bytes[40..44], 0.5f32.to_le_bytes());
        assert_eq!(bytes[44..48], 1i32.to_le_bytes());
    }

    #[test]
    fn test_from_bytes_truncated() {
        let bytes = Controls::default().to_bytes();
        assert_eq!(
            Controls::from_bytes(&bytes[..47]),
            Err(StateError::Truncated {
                expected: 48,
                actual: 47
            })
        );
    }

    #[test]
    fn test_from_bytes_rejects_nan() {
        let mut bytes = Controls::default().to_bytes();
        bytes[8..12].copy_from_slice(&f32::NAN.to_le_bytes());
        assert_eq!(
            Controls::from_bytes(&bytes),
            Err(StateError::NonFinite {
                field: "playback_rate"
            })
        );
    }

    #[test]
    fn test_nonzero_bypass_word_is_true() {
        let mut bytes = Controls::default().to_bytes();
        bytes[44..48].copy_from_slice(&7i32.to_le_bytes());
        assert!(Controls::from_bytes(&bytes).map(|c| c.bypass).unwrap_or(false));
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamId::ResampleRate.display(1.0, 44100.0), "44100 Hz");
        assert_eq!(ParamId::ResampleRate.display(0.0, 44100.0), "1000 Hz");
        assert_eq!(ParamId::ResampleRate.display(0.5, 44100.0), "22550 Hz");
        assert_eq!(ParamId::BitDepth.display(1.0, 44100.0), "16 Bits");
        assert_eq!(ParamId::BitDepth.display(0.5, 44100.0), "8 Bits");
        assert_eq!(ParamId::PlaybackRate.display(0.5, 44100.0), "75 %");
        assert_eq!(ParamId::ResampleLfo.display(0.0, 44100.0), "0.00 Hz");
        assert_eq!(ParamId::PlaybackRateLfo.display(1.0, 44100.0), "10.00 Hz");
        assert_eq!(ParamId::WetMix.display(0.25, 44100.0), "25 %");
    }

    #[test]
    fn test_error_messages() {
        let e = StateError::NonFinite { field: "wet_mix" };
        assert_eq!(e.to_string(), "stored value for `wet_mix` is not finite");
    }
}
