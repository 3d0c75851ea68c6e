//! Per-constellation epoch reconstruction (spec §4.6).
//!
//! MSM headers only carry a 30-bit time-of-week (or, for GLONASS, a
//! 3-bit day-of-week plus 27-bit time-of-day) field — never an
//! absolute date. [EpochReconstructor] seeds one week anchor per
//! constellation from a reference time supplied by the caller (the
//! first frame's receipt time, typically) and rolls the anchor
//! forward by a week whenever the raw counter wraps.

use crate::error::{Error, Result};
use gnss_rs::prelude::Constellation;
use hifitime::{Duration, Epoch, Unit};

const WEEK_SECONDS: f64 = 604_800.0;
const MAX_TOW_MS: u32 = (1 << 30) - 1;
const GLONASS_TOD_MASK: u32 = 0x07FF_FFFF; // low 27 bits

/// GPS and Galileo broadcast time-of-week in GPS/Galileo system time,
/// which runs 18s ahead of UTC (leap seconds accrued since 1980/1999).
const GPS_GALILEO_UTC_OFFSET_S: f64 = -18.0;
/// BeiDou system time trails GPST by 14s.
const BEIDOU_UTC_OFFSET_S: f64 = 14.0;
/// GLONASS broadcasts in Moscow time, UTC+3h.
const GLONASS_UTC_OFFSET_S: f64 = -3.0 * 3_600.0;

#[derive(Debug, Clone)]
struct ConstellationState {
    start_of_week: Epoch,
    previous_timestamp: Option<u32>,
}

#[derive(Debug, Clone)]
struct GlonassState {
    start_of_week: Epoch,
    previous_day: Option<u8>,
}

/// Tracks one rolling week anchor per supported constellation.
#[derive(Debug, Clone)]
pub struct EpochReconstructor {
    gps: ConstellationState,
    galileo: ConstellationState,
    beidou: ConstellationState,
    glonass: GlonassState,
}

impl EpochReconstructor {
    /// Seeds every constellation's week anchor from `reference`, the
    /// approximate current UTC time (e.g. the time the first frame of
    /// a session was received).
    pub fn new(reference: Epoch) -> Self {
        let sunday = most_recent_sunday_midnight_utc(reference);
        Self {
            gps: ConstellationState {
                start_of_week: sunday + Duration::from_seconds(GPS_GALILEO_UTC_OFFSET_S),
                previous_timestamp: None,
            },
            galileo: ConstellationState {
                start_of_week: sunday + Duration::from_seconds(GPS_GALILEO_UTC_OFFSET_S),
                previous_timestamp: None,
            },
            beidou: ConstellationState {
                start_of_week: sunday + Duration::from_seconds(BEIDOU_UTC_OFFSET_S),
                previous_timestamp: None,
            },
            glonass: GlonassState {
                start_of_week: sunday + Duration::from_seconds(GLONASS_UTC_OFFSET_S),
                previous_day: None,
            },
        }
    }

    /// Converts a raw MSM header timestamp into an absolute UTC
    /// [Epoch], advancing the constellation's week anchor if the
    /// timestamp has wrapped since the last call.
    pub fn resolve(&mut self, constellation: Constellation, timestamp: u32) -> Result<Epoch> {
        match constellation {
            Constellation::GPS => Self::advance_time_of_week(&mut self.gps, timestamp),
            Constellation::Galileo => Self::advance_time_of_week(&mut self.galileo, timestamp),
            Constellation::BeiDou => Self::advance_time_of_week(&mut self.beidou, timestamp),
            Constellation::Glonass => Self::advance_glonass(&mut self.glonass, timestamp),
            _ => Err(Error::UnsupportedConstellation),
        }
    }

    fn advance_time_of_week(state: &mut ConstellationState, timestamp: u32) -> Result<Epoch> {
        if timestamp > MAX_TOW_MS {
            return Err(Error::TimestampOutOfRange);
        }

        if let Some(previous) = state.previous_timestamp {
            if timestamp < previous {
                state.start_of_week = state.start_of_week + Duration::from_seconds(WEEK_SECONDS);
            }
        }
        state.previous_timestamp = Some(timestamp);

        Ok(state.start_of_week + Duration::from_seconds(timestamp as f64 / 1000.0))
    }

    fn advance_glonass(state: &mut GlonassState, timestamp: u32) -> Result<Epoch> {
        if timestamp > MAX_TOW_MS {
            return Err(Error::TimestampOutOfRange);
        }

        let day = ((timestamp >> 27) & 0x7) as u8;
        if day == 7 {
            return Err(Error::TimestampOutOfRange);
        }
        let time_of_day_ms = timestamp & GLONASS_TOD_MASK;

        if let Some(previous) = state.previous_day {
            if day < previous {
                state.start_of_week = state.start_of_week + Duration::from_seconds(WEEK_SECONDS);
            }
        }
        state.previous_day = Some(day);

        let offset = Duration::from_seconds(day as f64 * 86_400.0 + time_of_day_ms as f64 / 1000.0);
        Ok(state.start_of_week + offset)
    }
}

/// Midnight UTC of the most recent Sunday on or before `reference`.
fn most_recent_sunday_midnight_utc(reference: Epoch) -> Epoch {
    let unix_epoch = Epoch::from_gregorian_utc(1970, 1, 1, 0, 0, 0, 0);
    let elapsed_days = (reference - unix_epoch).to_unit(Unit::Day).floor();
    let days_since_epoch = elapsed_days as i64;

    // 1970-01-01 was a Thursday: weekday index 0 = Sunday, ..., 4 = Thursday.
    let weekday = (days_since_epoch.rem_euclid(7) + 4).rem_euclid(7);
    let sunday_days = days_since_epoch - weekday;

    unix_epoch + Duration::from_seconds((sunday_days * 86_400) as f64)
}
