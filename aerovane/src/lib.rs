// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # Project Aerovane
//!
//! Aerovane turns an RTL2832-based DVB-T dongle into a 433.92 MHz receiver
//! for low-cost wireless weather sensors. The pipeline derives an amplitude
//! envelope from the raw IQ stream, low-pass filters it, slices
//! pulse-width-modulated bits out of it, and decodes the assembled frames.
//!
//! ## Sensors
//!
//! The following sensor protocols are supported.
//!
//! | Protocol | Fields |
//! |----------|-----------------------------------------|
//! | Prologue | temperature, channel, ids, button flags |
//! | Rubicson | temperature, id                         |
//!
//! # Usage
//!
//! 1. Build a [`Pipeline`][core::pipeline::Pipeline] over the sensor set
//!    from [`default::get_sensors`], with a
//!    [`PipelineOptions`][core::pipeline::PipelineOptions] describing the
//!    decimation, detection level, and analyzer mode.
//! 2. Deliver blocks of interleaved 8-bit IQ samples to
//!    [`process_block`][core::pipeline::Pipeline::process_block], in order,
//!    from a single thread. Decoded readings are written to the report sink
//!    as they terminate.
//!
//! An example receiver application (aerovane-rx) can be found in the
//! project repository.

pub use aerovane_core as core;

pub mod sensors {
    //! The `sensors` module re-exports all enabled sensor decoders.

    pub use aerovane_sensors::{PrologueDecoder, PrologueReading};
    pub use aerovane_sensors::{RubicsonDecoder, RubicsonReading};
    pub use aerovane_sensors::{Reading, Sensor};
}

pub mod default {
    //! The `default` module provides the default decode table to get an
    //! implementer up-and-running as quickly as possible.

    use aerovane_sensors::Sensor;

    /// The default ordered decode table.
    pub fn get_sensors() -> Vec<Sensor> {
        vec![Sensor::prologue(), Sensor::rubicson()]
    }
}
