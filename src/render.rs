//! Deterministic, side-effect-free text rendering of a [Message]
//! (spec §4.8): a type banner, a hex+ASCII dump, and a type-specific
//! body, or a fallback line for anything this crate cannot decode.

use crate::message::{Message, MessageBody, NON_RTCM};
use hifitime::Epoch;

const BYTES_PER_LINE: usize = 16;

/// Renders `message` as a human-readable multi-line report. Pure: the
/// same `Message` always renders to the same string.
pub fn render_text(message: &Message) -> String {
    let mut out = String::new();
    out.push_str(&banner(message));
    out.push('\n');
    out.push_str(&hex_dump(&message.raw_data));

    if let Some(note) = &message.error_note {
        out.push_str(&format!("error: {note}\n"));
    }

    match &message.readable {
        Some(body) => out.push_str(&render_body(body, message.utc_time)),
        None if message.message_type != NON_RTCM => {
            out.push_str(&format!(
                "type {} currently cannot be displayed\n",
                message.message_type
            ));
        }
        None => {}
    }

    out
}

fn banner(message: &Message) -> String {
    format!(
        "message type {}, frame length {} bytes",
        message.message_type,
        message.raw_data.len()
    )
}

fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(BYTES_PER_LINE).enumerate() {
        let offset = i * BYTES_PER_LINE;
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        out.push_str(&format!("{offset:04x}  {:<47}  {ascii}\n", hex.join(" ")));
    }
    out
}

fn render_body(body: &MessageBody, utc_time: Option<Epoch>) -> String {
    match body {
        MessageBody::StationPosition(position) => format!(
            "ECEF coords in metres ({:.4}, {:.4}, {:.4})\n",
            position.ecef_x_metres(),
            position.ecef_y_metres(),
            position.ecef_z_metres()
        ),
        MessageBody::StationPositionWithHeight {
            position,
            antenna_height,
        } => format!(
            "ECEF coords in metres ({:.4}, {:.4}, {:.4}), antenna height {} mm\n",
            position.ecef_x_metres(),
            position.ecef_y_metres(),
            position.ecef_z_metres(),
            antenna_height
        ),
        MessageBody::Msm4(m) | MessageBody::Msm7(m) => {
            let mut s = format!(
                "station {} - {} satellites, {} signals, {} cells\n",
                m.header.station_id, m.header.num_satellites, m.header.num_signals, m.header.num_cells
            );
            if let Some(t) = utc_time {
                s.push_str(&format!("epoch: {t}\n"));
            }
            s
        }
        MessageBody::Unhandled { type_code } => {
            format!("type {type_code} currently cannot be displayed\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::position::StationPositionData;

    #[test]
    fn renders_non_rtcm_banner() {
        let msg = Message::non_rtcm(vec![0xDE, 0xAD]);
        let text = render_text(&msg);
        assert!(text.starts_with("message type -1, frame length 2 bytes\n"));
        assert!(text.contains("dead"));
    }

    #[test]
    fn renders_unhandled_fallback() {
        let msg = Message {
            message_type: 4095,
            raw_data: vec![0xD3, 0, 0],
            error_note: None,
            utc_time: None,
            readable: Some(MessageBody::Unhandled { type_code: 4095 }),
        };
        let text = render_text(&msg);
        assert!(text.starts_with("message type 4095, frame length 3 bytes\n"));
        assert!(text.contains("type 4095 currently cannot be displayed"));
    }

    #[test]
    fn renders_error_note_without_body() {
        let msg = Message {
            message_type: 1077,
            raw_data: vec![0xD3, 0, 0],
            error_note: Some("decoder overrun".to_string()),
            utc_time: None,
            readable: None,
        };
        let text = render_text(&msg);
        assert!(text.contains("error: decoder overrun"));
        assert!(text.contains("type 1077 currently cannot be displayed"));
    }

    #[test]
    fn hex_dump_wraps_at_sixteen_bytes() {
        let msg = Message::non_rtcm((0u8..20).collect());
        let text = render_text(&msg);
        let lines: Vec<&str> = text.lines().filter(|l| l.starts_with("00")).collect();
        assert_eq!(lines.len(), 2);
    }

    fn position(x_raw: i64, y_raw: i64, z_raw: i64) -> StationPositionData {
        // use decode() indirectly via a synthetic frame to avoid
        // depending on private fields
        let mut bits: Vec<bool> = Vec::new();
        fn push_bits(bits: &mut Vec<bool>, value: u64, width: usize) {
            for i in (0..width).rev() {
                bits.push((value >> i) & 1 == 1);
            }
        }
        fn push_signed(bits: &mut Vec<bool>, value: i64, width: usize) {
            let mask = (1u64 << width) - 1;
            push_bits(bits, (value as u64) & mask, width);
        }
        push_bits(&mut bits, 1005, 12);
        push_bits(&mut bits, 1, 12);
        push_bits(&mut bits, 0, 6);
        push_bits(&mut bits, 0, 4);
        push_signed(&mut bits, x_raw, 38);
        push_bits(&mut bits, 0, 2);
        push_signed(&mut bits, y_raw, 38);
        push_bits(&mut bits, 0, 2);
        push_signed(&mut bits, z_raw, 38);
        let mut out = vec![0u8; (bits.len() + 7) / 8];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                out[i / 8] |= 1 << (7 - (i % 8));
            }
        }
        let mut frame = vec![0xD3, 0x00, 0x00];
        frame.extend(out);
        crate::message::position::decode(&frame, 1005).unwrap().0
    }

    #[test]
    fn renders_station_position_with_four_decimals() {
        let position = position(123_456, 234_567, 345_678);
        let msg = Message {
            message_type: 1005,
            raw_data: vec![0xD3, 0, 0],
            error_note: None,
            utc_time: None,
            readable: Some(MessageBody::StationPosition(position)),
        };
        let text = render_text(&msg);
        assert!(text.contains("ECEF coords in metres (12.3456, 23.4567, 34.5678)"));
    }
}
