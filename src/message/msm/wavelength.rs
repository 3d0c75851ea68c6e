//! Static carrier-wavelength table, keyed by `(constellation, signal_id)`.
//!
//! `signal_id` is the 1-indexed bit position within an MSM's 32-bit
//! signal mask (spec §6/§3). Frequencies are nominal carrier
//! frequencies for each GNSS band; grounded on the same constants the
//! `rtcm2rnx` reference tool keeps (`FREQL1`, `FREQL2`, `FREQL5`,
//! `FREQE5_B`, ... transcribed from RTKLIB's `rtklib.h`). GLONASS uses
//! nominal (non-FDMA-shifted) G1/G2 carriers: per-channel Doppler
//! offsets are out of scope (spec §1 Non-goals).

use gnss_rs::prelude::Constellation;

const C_LIGHT: f64 = 299_792_458.0;

const FREQ_L1: f64 = 1.575_42e9;
const FREQ_L2: f64 = 1.227_60e9;
const FREQ_L5: f64 = 1.176_45e9;
const FREQ_E5B: f64 = 1.207_14e9;
const FREQ_E5AB: f64 = 1.191_795e9;
const FREQ_E6: f64 = 1.278_75e9;
const FREQ_B1I: f64 = 1.561_098e9;
const FREQ_B2I: f64 = 1.207_14e9;
const FREQ_B3I: f64 = 1.268_52e9;
const FREQ_G1: f64 = 1.602_00e9;
const FREQ_G2: f64 = 1.246_00e9;

/// Returns the carrier wavelength in metres for `(constellation,
/// signal_id)`, or `None` if the pair is not in the table.
pub fn wavelength(constellation: Constellation, signal_id: u8) -> Option<f64> {
    frequency_hz(constellation, signal_id).map(|f| C_LIGHT / f)
}

fn frequency_hz(constellation: Constellation, signal_id: u8) -> Option<f64> {
    match constellation {
        Constellation::GPS | Constellation::QZSS => match signal_id {
            2..=4 => Some(FREQ_L1),        // L1 C/A, P(Y), Z-tracking
            8..=14 => Some(FREQ_L2),       // L2C (M/L/M+L), L2P(Y), Z-tracking
            22..=24 => Some(FREQ_L5),      // L5 I/Q/I+Q
            30..=32 => Some(FREQ_L1),      // L1C (D/P/D+P)
            _ => None,
        },
        Constellation::Galileo => match signal_id {
            2..=5 => Some(FREQ_L1),        // E1 B/C/B+C
            6..=8 => Some(FREQ_E5B),       // E5b I/Q/I+Q
            9..=11 => Some(FREQ_L5),       // E5a I/Q/I+Q
            12..=14 => Some(FREQ_E5AB),    // E5 (a+b) I/Q/I+Q
            16..=18 => Some(FREQ_E6),      // E6 B/C/B+C
            _ => None,
        },
        Constellation::BeiDou => match signal_id {
            2..=4 => Some(FREQ_B1I),
            8..=10 => Some(FREQ_B2I),
            11..=13 => Some(FREQ_B3I),
            14..=16 => Some(FREQ_L1), // B1C
            _ => None,
        },
        Constellation::Glonass => match signal_id {
            2..=4 => Some(FREQ_G1),
            8..=10 => Some(FREQ_G2),
            _ => None,
        },
        _ => None,
    }
}
