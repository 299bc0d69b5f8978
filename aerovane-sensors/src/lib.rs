// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Decoders for the pulse-width-modulated 433.92 MHz sensor protocols.
//!
//! Each protocol family transmits a short frame several times per event; the
//! decoders pick the most reliable repetition out of the accumulated
//! [`BitFrame`](aerovane_core::frame::BitFrame) and interpret its fields.
//!
//! The set of protocols is a closed variant: adding one means extending
//! [`Sensor`], [`Reading`], and the default decode table.

use std::fmt;

use aerovane_core::demod::PwmTiming;
use aerovane_core::errors::Result;
use aerovane_core::frame::BitFrame;
use aerovane_core::sensor::{SensorDecode, SensorInfo};

mod common;
mod sensor_prologue;
mod sensor_rubicson;

pub use sensor_prologue::{PrologueDecoder, PrologueReading};
pub use sensor_rubicson::{RubicsonDecoder, RubicsonReading};

/// The closed set of supported sensor protocols.
pub enum Sensor {
    Prologue(PrologueDecoder),
    Rubicson(RubicsonDecoder),
}

impl Sensor {
    pub fn prologue() -> Self {
        Sensor::Prologue(PrologueDecoder)
    }

    pub fn rubicson() -> Self {
        Sensor::Rubicson(RubicsonDecoder)
    }
}

/// A decoded reading from any supported sensor.
pub enum Reading {
    Prologue(PrologueReading),
    Rubicson(RubicsonReading),
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Prologue(reading) => reading.fmt(f),
            Reading::Rubicson(reading) => reading.fmt(f),
        }
    }
}

impl SensorDecode for Sensor {
    type Reading = Reading;

    fn info(&self) -> SensorInfo {
        match self {
            Sensor::Prologue(decoder) => decoder.info(),
            Sensor::Rubicson(decoder) => decoder.info(),
        }
    }

    fn timing(&self) -> PwmTiming {
        match self {
            Sensor::Prologue(decoder) => decoder.timing(),
            Sensor::Rubicson(decoder) => decoder.timing(),
        }
    }

    fn decode(&self, frame: &BitFrame) -> Result<Reading> {
        match self {
            Sensor::Prologue(decoder) => decoder.decode(frame).map(Reading::Prologue),
            Sensor::Rubicson(decoder) => decoder.decode(frame).map(Reading::Rubicson),
        }
    }
}
