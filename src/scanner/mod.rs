//! RTCM frame scanner: locates, length-parses and CRC-validates frames
//! in a lossy byte stream (spec §4.4).
//!
//! [Scanner] is an [Iterator] over [ScanEvent]s. Concatenating the bytes
//! of every emitted event, in emission order, reconstructs the input
//! stream byte-for-byte (spec §8).

use crate::crc24q;
use crate::pushback::{ByteSource, Pushback};

const SENTINEL: u8 = 0xD3;

/// The 10-bit length ceiling (`2^10 - 1`); total frame length never
/// exceeds `MAX_PAYLOAD_LEN + 6`.
const MAX_PAYLOAD_LEN: usize = 1023;

/// One event the scanner emits for a run of input bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A CRC-validated RTCM frame: `bytes[0] == 0xD3`, trailing 3 bytes
    /// are its CRC-24Q.
    Frame(Vec<u8>),
    /// A run of bytes that is not part of a valid RTCM frame (line
    /// noise, NMEA/UBX, a corrupted or truncated candidate frame).
    NonRtcm(Vec<u8>),
}

impl ScanEvent {
    /// Borrows the bytes carried by either variant.
    pub fn bytes(&self) -> &[u8] {
        match self {
            ScanEvent::Frame(b) | ScanEvent::NonRtcm(b) => b,
        }
    }
}

/// Byte-oriented state machine that turns a raw stream into [ScanEvent]s.
pub struct Scanner<S: ByteSource> {
    pb: Pushback<S>,
}

impl<S: ByteSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            pb: Pushback::new(source),
        }
    }

    /// `true` once the scanner has nothing left to emit, ever.
    pub fn is_exhausted(&self) -> bool {
        self.pb.is_exhausted()
    }

    fn scan_one(&mut self) -> Option<ScanEvent> {
        // 1. eat bytes until the sentinel or end of stream.
        let mut leading = Vec::new();
        loop {
            match self.pb.next() {
                Some(SENTINEL) => break,
                Some(b) => leading.push(b),
                None => {
                    return if leading.is_empty() {
                        None
                    } else {
                        Some(ScanEvent::NonRtcm(leading))
                    };
                }
            }
        }

        if !leading.is_empty() {
            // sentinel arrived mid-run: report the run, replay the
            // sentinel as the next call's first byte.
            self.pb.push_back(SENTINEL);
            return Some(ScanEvent::NonRtcm(leading));
        }

        // 2. read leader (two bytes following the sentinel).
        let mut buf = vec![SENTINEL];
        let b1 = match self.pb.next() {
            Some(b) => b,
            None => return Some(ScanEvent::NonRtcm(buf)),
        };
        buf.push(b1);

        let b2 = match self.pb.next() {
            Some(b) => b,
            None => return Some(ScanEvent::NonRtcm(buf)),
        };
        buf.push(b2);

        // top 6 bits of b1 must be zero.
        if b1 & 0xFC != 0 {
            return Some(ScanEvent::NonRtcm(buf));
        }

        let length = (((b1 & 0x03) as usize) << 8) | (b2 as usize);
        if length == 0 || length > MAX_PAYLOAD_LEN {
            return Some(ScanEvent::NonRtcm(buf));
        }

        // 3. read body: payload + 3-byte CRC.
        for _ in 0..(length + 3) {
            match self.pb.next() {
                Some(b) => buf.push(b),
                None => return Some(ScanEvent::NonRtcm(buf)),
            }
        }

        // 4. verify CRC-24Q.
        if crc24q::verify(&buf) {
            Some(ScanEvent::Frame(buf))
        } else {
            Some(ScanEvent::NonRtcm(buf))
        }
    }
}

impl<S: ByteSource> Iterator for Scanner<S> {
    type Item = ScanEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan_one()
    }
}
