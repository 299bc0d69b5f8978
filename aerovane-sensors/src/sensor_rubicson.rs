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

/// Rubicson outdoor thermometer.
///
/// The sensor transmits 36 bits twelve times per reading, grouped in nine
/// nibbles: `[id0] [id1] [chan?/temp0] [temp1] [temp2] ...`. The id changes
/// whenever the batteries are replaced. Temperature is 12-bit signed in
/// tenths of a degree Celsius.
pub struct RubicsonDecoder;

const TIMING: PwmTiming = PwmTiming { short_limit: 1744, long_limit: 3500, reset_limit: 5000 };

impl RubicsonDecoder {
    pub fn info(&self) -> SensorInfo {
        SensorInfo { short_name: "rubicson", long_name: "Rubicson outdoor temperature sensor" }
    }

    pub fn timing(&self) -> PwmTiming {
        TIMING
    }

    /// Decode the first frame repetition.
    pub fn decode(&self, frame: &BitFrame) -> Result<RubicsonReading> {
        let row = frame.row(0);

        // Nibbles 3..6 hold the temperature: the low nibble of byte 1 and
        // all of byte 2, sign-extended from 12 bits.
        let temp = ((u16::from(row[1]) << 12) | (u16::from(row[2]) << 4)) as i16 >> 4;

        Ok(RubicsonReading { rid: row[0], temp })
    }
}

pub struct RubicsonReading {
    /// Raw id byte; the upper nibble is the rolling sensor id.
    pub rid: u8,
    /// Temperature in tenths of a degree Celsius.
    pub temp: i16,
}

impl RubicsonReading {
    pub fn id(&self) -> u8 {
        self.rid >> 4
    }
}

impl fmt::Display for RubicsonReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rid = {:x}", self.rid)?;
        writeln!(f, "temp = {}", Tenths(self.temp))?;
        writeln!(f)
    }
}
