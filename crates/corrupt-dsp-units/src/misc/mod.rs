// SPDX-License-Identifier: LGPL-3.0-or-later

//! Modulation and amplitude-quantization units.
//!
//! - **LFO**: table-driven sine oscillator in [0, 1]
//! - **Bit crusher**: amplitude quantizer with makeup gain and LFO

pub mod bitcrusher;
pub mod lfo;
