// SPDX-License-Identifier: LGPL-3.0-or-later

//! Buffer utilities.

pub mod record_buffer;
