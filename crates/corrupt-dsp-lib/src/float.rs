// SPDX-License-Identifier: LGPL-3.0-or-later

//! Floating-point utility functions.
//!
//! These functions keep recursive signal paths (filters, envelopes) out of
//! the denormal range, where many CPUs fall off a performance cliff.

/// Offset used by [`undenormalise`]. Large enough that any denormal vanishes
/// in the addition, small enough to leave audible signal levels intact.
pub const UNDENORMAL_OFFSET: f32 = 0.1;

/// Flush a denormal to zero with the epsilon add/subtract trick.
///
/// Adding and subtracting [`UNDENORMAL_OFFSET`] rounds any value whose
/// magnitude lies far below the offset's ULP to exactly zero, without a
/// branch. Normal-range values pass through (with at most the rounding of
/// one ULP of the offset).
#[inline(always)]
pub fn undenormalise(x: f32) -> f32 {
    (x + UNDENORMAL_OFFSET) - UNDENORMAL_OFFSET
}

/// Limit a float value to the range `[-1.0, 1.0]`.
#[inline]
pub fn limit1(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}
