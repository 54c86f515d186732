// SPDX-License-Identifier: LGPL-3.0-or-later

//! Engine limits and dither constants.

// Record / playback limits

/// Longest stretch of audio the record buffer holds, in seconds.
pub const MAX_RECORD_SECONDS: f32 = 30.0;

/// Slowest playback speed (0.5 = half speed, one octave down).
pub const MIN_PLAYBACK_SPEED: f32 = 0.5;

/// Lowest effective sample rate reachable through downsampling (Hz).
pub const MIN_SAMPLE_RATE: f32 = 1000.0;

/// Sample rate assumed until the host reports one (Hz).
pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// Smallest denominator used when dividing by a user-controlled amount.
pub const MIN_DENOMINATOR: f32 = 1e-9;

// Modulation limits

/// Slowest LFO rate (Hz), reached at a rate percentage just above zero.
pub const MIN_LFO_RATE: f32 = 0.1;

/// Fastest LFO rate (Hz), reached at a rate percentage of one.
pub const MAX_LFO_RATE: f32 = 10.0;

// Bit depth

/// Resolution treated as "full" by the bit crusher.
pub const MAX_BIT_DEPTH: u32 = 16;

// Dither (one LSB of a 16-bit word)

/// Positive full scale of a 16-bit word.
pub const DITHER_WORD_LENGTH: f32 = 32768.0;

/// Width of the dither noise.
pub const DITHER_WI: f32 = 1.0 / DITHER_WORD_LENGTH;

/// Offset removing the DC component of the unipolar dither noise.
pub const DITHER_DC_OFFSET: f32 = DITHER_WI * 0.5;
