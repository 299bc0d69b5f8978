// Aerovane
// Copyright (c) 2026 The Aerovane Project Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use aerovane_core::demod::PwmTiming;
use aerovane_core::errors::Result;
use aerovane_core::frame::BitFrame;
use aerovane_core::sensor::SensorInfo;

use crate::common::Tenths;

/// Prologue indoor/outdoor thermometer.
///
/// The sensor transmits 36 bits seven times per reading, grouped in nine
/// nibbles: `[id0] [rid0] [rid1] [flags] [temp0] [temp1] [temp2] [unk0]
/// [unk1]`. `id0` is nominally 9. The random id is regenerated whenever the
/// sensor restarts. The flags nibble carries the channel selector, the
/// button indicator, and the first-reading indicator.
pub struct PrologueDecoder;

const TIMING: PwmTiming = PwmTiming { short_limit: 3500, long_limit: 7000, reset_limit: 15000 };

impl PrologueDecoder {
    pub fn info(&self) -> SensorInfo {
        SensorInfo { short_name: "prologue", long_name: "Prologue temperature sensor" }
    }

    pub fn timing(&self) -> PwmTiming {
        TIMING
    }

    /// Decode the second frame repetition; the first is often mangled by the
    /// receiver's AGC settling on the initial burst.
    pub fn decode(&self, frame: &BitFrame) -> Result<PrologueReading> {
        let row = frame.row(1);

        let temp = ((u16::from(row[2]) << 8) | u16::from(row[3] & 0xF0)) as i16 >> 4;

        Ok(PrologueReading {
            id: row[0] >> 4,
            rid: (row[0] & 0x0F) << 4 | (row[1] & 0xF0) >> 4,
            channel: (row[1] & 0x03) + 1,
            button: row[1] & 0x04 != 0,
            first_reading: row[1] & 0x08 == 0,
            temp,
        })
    }
}

pub struct PrologueReading {
    /// Sensor family nibble, nominally 9.
    pub id: u8,
    /// Random id, regenerated when the sensor restarts.
    pub rid: u8,
    /// Channel selector, 1 to 3.
    pub channel: u8,
    /// Reading was triggered by the button on the sensor.
    pub button: bool,
    /// First reading since the sensor started.
    pub first_reading: bool,
    /// Temperature in tenths of a degree Celsius.
    pub temp: i16,
}

impl fmt::Display for PrologueReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "button = {}", self.button as u8)?;
        writeln!(f, "first reading = {}", self.first_reading as u8)?;
        writeln!(f, "temp = {}", Tenths(self.temp))?;
        writeln!(f, "channel = {}", self.channel)?;
        writeln!(f, "id = {}", self.id)?;
        writeln!(f, "rid = {}", self.rid)?;
        writeln!(f, "hrid = {:02x}", self.rid)?;
        writeln!(f)
    }
}
