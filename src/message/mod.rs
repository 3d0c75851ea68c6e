//! Message classification: turns a validated RTCM frame into a typed
//! [Message] (spec §4.5/§4.6).

pub mod msm;
pub mod position;

use crate::bitreader::read_u64;
use crate::epoch::EpochReconstructor;
use crate::error::Error;
use crate::message::msm::{MsmMessage, MsmVariant};
use crate::message::position::StationPositionData;
use hifitime::Epoch;

/// Top 6 bits of leader byte 1 must be zero; the length field is
/// bottom 2 bits of byte 1 + all of byte 2.
const LEADER_RESERVED_MASK: u8 = 0xFC;
const SENTINEL: u8 = 0xD3;

/// Sentinel `message_type` for frames the scanner rejected (spec §4.7).
pub const NON_RTCM: i32 = -1;

/// The decoded body of a [Message], when decoding succeeded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageBody {
    StationPosition(StationPositionData),
    StationPositionWithHeight {
        position: StationPositionData,
        antenna_height: u16,
    },
    Msm4(MsmMessage),
    Msm7(MsmMessage),
    /// Recognized as a frame, but not a type this crate decodes.
    Unhandled { type_code: u16 },
}

/// One RTCM frame (or rejected non-RTCM byte run) plus whatever this
/// crate could make of it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// `-1` ([NON_RTCM]) for bytes the scanner rejected; otherwise the
    /// 12-bit RTCM message type.
    pub message_type: i32,
    pub raw_data: Vec<u8>,
    pub error_note: Option<String>,
    pub utc_time: Option<Epoch>,
    pub readable: Option<MessageBody>,
}

impl Message {
    /// Wraps a [crate::scanner::ScanEvent::NonRtcm] run, recording why
    /// the scanner rejected it (spec §7/§8: every such run either
    /// doesn't start with `0xD3`, has a malformed leader, failed its
    /// CRC, or was cut short by end of stream).
    pub fn non_rtcm(bytes: Vec<u8>) -> Self {
        let error_note = Some(classify_rejection(&bytes).to_string());
        Message {
            message_type: NON_RTCM,
            raw_data: bytes,
            error_note,
            utc_time: None,
            readable: None,
        }
    }
}

/// Determines, from the bytes alone, which [Error] kind explains why
/// the scanner emitted this run as `NonRtcm` rather than `Frame`.
fn classify_rejection(bytes: &[u8]) -> Error {
    if bytes.first() != Some(&SENTINEL) {
        return Error::InvalidLeader;
    }
    if bytes.len() < 3 {
        return Error::Truncated;
    }

    let length = (((bytes[1] & 0x03) as usize) << 8) | (bytes[2] as usize);
    if bytes[1] & LEADER_RESERVED_MASK != 0 || length == 0 {
        return Error::InvalidLeader;
    }
    if bytes.len() < length + 6 {
        return Error::Truncated;
    }
    Error::CrcMismatch
}

/// Classifies a CRC-validated frame (as produced by
/// [crate::scanner::ScanEvent::Frame]) and decodes its body, recording
/// any decode failure in `error_note` rather than discarding the
/// frame.
pub fn classify(frame_bytes: &[u8]) -> Message {
    let raw_data = frame_bytes.to_vec();

    let message_type = match read_u64(frame_bytes, 24, 12) {
        Ok(v) => v as u16,
        Err(_) => {
            return Message {
                message_type: NON_RTCM,
                raw_data,
                error_note: Some("frame too short to carry a message type".to_string()),
                utc_time: None,
                readable: None,
            };
        }
    };

    let (readable, error_note) = decode_body(frame_bytes, message_type);

    Message {
        message_type: message_type as i32,
        raw_data,
        error_note,
        utc_time: None,
        readable,
    }
}

fn decode_body(frame: &[u8], message_type: u16) -> (Option<MessageBody>, Option<String>) {
    match message_type {
        1005 | 1006 => match position::decode(frame, message_type) {
            Ok((position, Some(antenna_height))) => (
                Some(MessageBody::StationPositionWithHeight {
                    position,
                    antenna_height,
                }),
                None,
            ),
            Ok((position, None)) => (Some(MessageBody::StationPosition(position)), None),
            Err(e) => (None, Some(e.to_string())),
        },
        _ => match msm::variant_for_type(message_type) {
            Some(variant) => match msm::decode(frame, message_type) {
                Ok(msm_message) => {
                    let body = match variant {
                        MsmVariant::Msm4 => MessageBody::Msm4(msm_message),
                        MsmVariant::Msm7 => MessageBody::Msm7(msm_message),
                    };
                    (Some(body), None)
                }
                Err(e) => (None, Some(e.to_string())),
            },
            None => (Some(MessageBody::Unhandled { type_code: message_type }), None),
        },
    }
}

/// Fills in `utc_time` on a classified MSM4/MSM7 [Message] using
/// `reconstructor`'s rolling per-constellation week anchors. A no-op
/// for any other message body. Failures (unsupported constellation,
/// out-of-range timestamp) are recorded in `error_note` instead of
/// panicking — the message is kept, just without a timestamp.
pub fn timestamp(reconstructor: &mut EpochReconstructor, message: &mut Message) {
    let (timestamp, message_type) = match &message.readable {
        Some(MessageBody::Msm4(m)) | Some(MessageBody::Msm7(m)) => {
            (m.header.timestamp, m.header.message_type)
        }
        _ => return,
    };

    let constellation = match msm::constellation_for_type(message_type) {
        Some(c) => c,
        None => return,
    };

    match reconstructor.resolve(constellation, timestamp) {
        Ok(epoch) => message.utc_time = Some(epoch),
        Err(e) => message.error_note = Some(e.to_string()),
    }
}
