use thiserror::Error;

/// Errors produced by the bit reader, frame scanner, message classifier
/// and epoch reconstructor.
///
/// None of these ever unwind the scanner: per the propagation policy, a
/// decode failure is attached to the offending [crate::message::Message]
/// as an `error_note` and the byte stream keeps flowing. Only end of
/// stream terminates the scanner (see [crate::scanner::Scanner]).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A bit-field read past the end of the supplied buffer.
    #[error("bit range out of bounds: offset {offset} + width {width} > {available} bits")]
    BitRangeOutOfBounds {
        offset: usize,
        width: usize,
        available: usize,
    },

    /// Non-RTCM bytes, or a `0xD3` sentinel followed by a malformed
    /// length field (top 6 bits of the second leader byte are non-zero,
    /// or the derived payload length is zero or exceeds the 10-bit
    /// ceiling).
    #[error("invalid frame leader")]
    InvalidLeader,

    /// The leader was well-formed, the body was fully read, but the
    /// trailing CRC-24Q did not match the recomputed value.
    #[error("CRC-24Q mismatch")]
    CrcMismatch,

    /// End of stream was reached while a frame was still being read.
    #[error("stream truncated mid-frame")]
    Truncated,

    /// A decoder needed more bits than the frame actually carries.
    #[error("decoder overrun: needed {needed} bits, frame carries {available}")]
    Overrun { needed: usize, available: usize },

    /// `popcount(satellite_mask) * popcount(signal_mask)` exceeds 64,
    /// i.e. the cell mask would not fit in a `u64`.
    #[error("too many signals: {nsat} satellites * {nsig} signals > 64")]
    TooManySignals { nsat: u32, nsig: u32 },

    /// Fewer than 169 bits remain after the leader for an MSM header.
    #[error("MSM header too short: {available} bits available")]
    HeaderTooShort { available: usize },

    /// A 30-bit MSM timestamp exceeded `2^30 - 1`, or (Glonass) the
    /// 3-bit day field was the invalid-day sentinel `7`.
    #[error("timestamp out of range")]
    TimestampOutOfRange,

    /// Message type is not 1005/1006 or an MSM4/MSM7 of a known
    /// constellation.
    #[error("type {0} currently cannot be displayed")]
    UnsupportedMessageType(u16),

    /// MSM for a constellation the epoch reconstructor has no seed for
    /// (SBAS, QZSS, NavIC/IRNSS).
    #[error("unsupported constellation for epoch reconstruction")]
    UnsupportedConstellation,
}

pub type Result<T> = std::result::Result<T, Error>;
