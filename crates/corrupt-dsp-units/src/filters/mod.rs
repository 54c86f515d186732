// SPDX-License-Identifier: LGPL-3.0-or-later

//! Anti-aliasing filters built on the direct-form-I section of
//! `corrupt_dsp_lib`.

pub mod lowpass;
