// SPDX-License-Identifier: LGPL-3.0-or-later

//! # corrupt-dsp-units
//!
//! Sample-rate, bit-depth and playback-speed corruption processors built on
//! top of [`corrupt_dsp_lib`]. It includes:
//!
//! - **Corrupter**: the [`corrupter::engine::Engine`] and its host-facing
//!   [`corrupter::processor::Processor`]
//! - **Filters**: second-order anti-aliasing low-pass
//! - **Dynamics**: soft/hard knee peak limiter
//! - **Misc**: LFO and bit crusher
//! - **Utilities**: multi-channel record buffer
//!
//! All processing is allocation-free once buffers are sized; allocation
//! happens only when the channel count or block size grows.

// Foundational modules
pub mod consts;
pub mod units;

pub mod corrupter;
pub mod dynamics;
pub mod filters;
pub mod misc;
pub mod util;
