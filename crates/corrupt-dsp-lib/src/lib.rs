// SPDX-License-Identifier: LGPL-3.0-or-later

//! # corrupt-dsp-lib
//!
//! Low-level DSP primitives used by `corrupt-dsp-units` to build the
//! sample-rate / bit-depth / playback-speed corruption processors.
//!
//! - **Samples**: the [`sample::Sample`] trait so host buffers can be either
//!   `f32` or `f64` while the signal path stays in `f32`
//! - **Buffer operations**: typed copy, fill, silence detection
//! - **Mixing**: dry/wet blend of planar buffers into host buffers
//! - **Filters**: second-order direct-form-I section with denormal flushing
//! - **Float utilities**: denormal flushing, clamping
//!
//! ## Design
//!
//! Every function here is allocation-free and safe to call from the audio
//! thread. The `f32`-only loops use runtime SIMD dispatch via the
//! `multiversion` crate; the sample-width generic helpers are plain loops.

pub mod copy;
pub mod filters;
pub mod float;
pub mod mix;
pub mod sample;
pub mod types;
