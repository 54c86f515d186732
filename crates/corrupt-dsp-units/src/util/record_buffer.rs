// SPDX-License-Identifier: LGPL-3.0-or-later

//! Multi-channel record buffer for the corruption engine.
//!
//! All channels live in one contiguous allocation, channel after channel,
//! each `frames` samples long. The buffer holds no pointers of its own:
//! the engine writes at an integer position and reads back at a truncated
//! fractional one, both wrapped to [`RecordBuffer::frames`].
//!
//! # Examples
//! ```
//! use corrupt_dsp_units::util::record_buffer::RecordBuffer;
//!
//! let mut rb = RecordBuffer::new();
//! rb.init(2, 1000.0, 64);
//! assert_eq!(rb.frames(), 30016); // 30 s rounded up to whole blocks
//! rb.write(1, 5, 0.25);
//! assert_eq!(rb.read(1, 5), 0.25);
//! assert_eq!(rb.read(0, 5), 0.0);
//! ```

use crate::consts::MAX_RECORD_SECONDS;
use crate::units::seconds_to_samples;

/// Frames needed to hold [`MAX_RECORD_SECONDS`] at `sample_rate`, rounded
/// up to a whole number of `block_size` blocks.
pub fn record_frames(sample_rate: f32, block_size: usize) -> usize {
    let block = block_size.max(1);
    let wanted = seconds_to_samples(sample_rate.max(0.0), MAX_RECORD_SECONDS).ceil() as usize;
    wanted.div_ceil(block).max(1) * block
}

/// Contiguous per-channel sample storage.
#[derive(Debug, Clone, Default)]
pub struct RecordBuffer {
    data: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl RecordBuffer {
    /// Create an empty buffer (no storage allocated).
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)allocate storage for `channels` channels and clear it.
    ///
    /// # Arguments
    /// * `channels` - Number of channels
    /// * `sample_rate` - Sample rate in Hz
    /// * `block_size` - Largest host block, the per-channel length is a multiple of it
    pub fn init(&mut self, channels: usize, sample_rate: f32, block_size: usize) {
        self.channels = channels.max(1);
        self.frames = record_frames(sample_rate, block_size);
        self.data.clear();
        self.data.resize(self.channels * self.frames, 0.0);
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Length of each channel in samples.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Total number of stored samples (`channels * frames`).
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Whether storage has been allocated.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Silence every channel.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Store `value` at `pos` of `channel`.
    #[inline]
    pub fn write(&mut self, channel: usize, pos: usize, value: f32) {
        self.data[channel * self.frames + pos] = value;
    }

    /// Sample at `pos` of `channel`.
    #[inline]
    pub fn read(&self, channel: usize, pos: usize) -> f32 {
        self.data[channel * self.frames + pos]
    }

    /// Immutable view of one channel.
    pub fn channel(&self, channel: usize) -> &[f32] {
        let start = channel * self.frames;
        &self.data[start..start + self.frames]
    }

    /// Whether every stored sample is zero.
    pub fn is_silent(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }
}
