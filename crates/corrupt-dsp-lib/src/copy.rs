// SPDX-License-Identifier: LGPL-3.0-or-later

//! Buffer copy, fill, conversion and silence detection.

use crate::sample::Sample;

/// Copy `src` into `dst`.
///
/// # Panics
/// Panics if `dst.len() < src.len()`.
pub fn copy<S: Sample>(dst: &mut [S], src: &[S]) {
    assert!(dst.len() >= src.len(), "dst too small");
    dst[..src.len()].copy_from_slice(src);
}

/// Fill `dst` with silence.
pub fn fill_zero<S: Sample>(dst: &mut [S]) {
    dst.fill(S::ZERO);
}

/// Convert a host buffer into the internal `f32` representation.
///
/// # Panics
/// Panics if `dst.len() < src.len()`.
pub fn to_f32<S: Sample>(dst: &mut [f32], src: &[S]) {
    assert!(dst.len() >= src.len(), "dst too small");
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = s.to_f32();
    }
}

/// Convert an internal `f32` buffer into a host buffer.
///
/// # Panics
/// Panics if `dst.len() < src.len()`.
pub fn from_f32<S: Sample>(dst: &mut [S], src: &[f32]) {
    assert!(dst.len() >= src.len(), "dst too small");
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d = S::from_f32(*s);
    }
}

/// Check whether every sample of `buf` is exactly zero.
///
/// An empty buffer counts as silent.
pub fn is_silent<S: Sample>(buf: &[S]) -> bool {
    buf.iter().all(|&s| s == S::ZERO)
}
