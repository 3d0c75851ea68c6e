//! Station position (RTCM 1005/1006) decoding (spec §4.5).
//!
//! Both message types share a 152-bit body; 1006 appends a 16-bit
//! antenna height. ECEF coordinates are 38-bit signed fields with
//! 0.0001 m resolution.

use crate::bitreader::read_i64;
use crate::bitreader::read_u64;
use crate::error::{Error, Result};

const BODY_BITS_1005: usize = 152;
const BODY_BITS_1006: usize = 168;
const ECEF_RESOLUTION: f64 = 0.0001;

/// Decoded antenna reference point position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationPositionData {
    pub station_id: u16,
    pub itrf_realisation_year: u8,
    ecef_x_raw: i64,
    ecef_y_raw: i64,
    ecef_z_raw: i64,
}

impl StationPositionData {
    pub fn ecef_x_metres(&self) -> f64 {
        self.ecef_x_raw as f64 * ECEF_RESOLUTION
    }

    pub fn ecef_y_metres(&self) -> f64 {
        self.ecef_y_raw as f64 * ECEF_RESOLUTION
    }

    pub fn ecef_z_metres(&self) -> f64 {
        self.ecef_z_raw as f64 * ECEF_RESOLUTION
    }
}

/// Decodes a 1005 (no antenna height) or 1006 (with antenna height)
/// body, starting right after the 3-byte leader.
pub fn decode(frame: &[u8], message_type: u16) -> Result<(StationPositionData, Option<u16>)> {
    let needed = match message_type {
        1005 => BODY_BITS_1005,
        1006 => BODY_BITS_1006,
        other => return Err(Error::UnsupportedMessageType(other)),
    };

    let total_bits = frame.len() * 8;
    let available = total_bits.saturating_sub(24);
    if available < needed {
        return Err(Error::Overrun {
            needed,
            available,
        });
    }

    let mut o = 24;
    let _message_type = read_u64(frame, o, 12)? as u16;
    o += 12;
    let station_id = read_u64(frame, o, 12)? as u16;
    o += 12;
    let itrf_realisation_year = read_u64(frame, o, 6)? as u8;
    o += 6;
    o += 4; // reserved (GPS/GLONASS/Galileo indicator bits, unused)
    let ecef_x_raw = read_i64(frame, o, 38)?;
    o += 38;
    o += 2; // reserved
    let ecef_y_raw = read_i64(frame, o, 38)?;
    o += 38;
    o += 2; // reserved
    let ecef_z_raw = read_i64(frame, o, 38)?;
    o += 38;

    let position = StationPositionData {
        station_id,
        itrf_realisation_year,
        ecef_x_raw,
        ecef_y_raw,
        ecef_z_raw,
    };

    let antenna_height = if message_type == 1006 {
        let h = read_u64(frame, o, 16)? as u16;
        o += 16;
        Some(h)
    } else {
        None
    };

    let _ = o;
    Ok((position, antenna_height))
}
