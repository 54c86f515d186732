// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad filter processing (direct form I, static coefficients).
//!
//! The recurrence keeps the raw input history next to the output history,
//! so coefficients can be swapped between blocks without the transient a
//! transposed form would produce:
//! ```text
//!   y    = b0*x + b1*x1 + b2*x2 - a1*y1 - a2*y2
//!   x2   = x1;  x1 = x
//!   y2   = y1;  y1 = y
//! ```
//!
//! Every output is passed through [`undenormalise`] before it is fed back,
//! so a decaying tail reaches exact zero instead of lingering in the
//! denormal range.

use crate::float::undenormalise;
use crate::types::{Df1Coeffs, Df1State};

/// Process one sample through a direct-form-I section.
#[inline(always)]
pub fn df1_process_single(x: f32, c: &Df1Coeffs, s: &mut Df1State) -> f32 {
    let y = undenormalise(c.b0 * x + c.b1 * s.x1 + c.b2 * s.x2 - c.a1 * s.y1 - c.a2 * s.y2);

    s.x2 = s.x1;
    s.x1 = x;
    s.y2 = s.y1;
    s.y1 = y;

    y
}

/// Process a buffer in place through a direct-form-I section.
pub fn df1_process(buf: &mut [f32], c: &Df1Coeffs, s: &mut Df1State) {
    for sample in buf.iter_mut() {
        *sample = df1_process_single(*sample, c, s);
    }
}
