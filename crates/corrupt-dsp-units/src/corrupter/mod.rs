// SPDX-License-Identifier: LGPL-3.0-or-later

//! The corruption processor.
//!
//! - [`engine`]: record buffer, sample-and-hold playback and the
//!   filter / crusher / limiter chain
//! - [`controls`]: normalized host controls and their persisted layout
//! - [`processor`]: transport, bypass and state handling around the engine

pub mod controls;
pub mod engine;
pub mod processor;
