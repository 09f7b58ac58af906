//! # repo256-wire — Wire Layer
//!
//! Decodes and encodes the two TLV dialects the repository speaks and
//! hides the difference behind one facade:
//!
//! - **CCNx TLV** (`ccntlv`): fixed header, 16-bit type/length TLVs.
//! - **NDN TLV** (`ndntlv`): varint type/length TLVs.
//! - **Facade** (`decode_frame`): consumes optional encoding-switch
//!   framing, identifies the suite from the byte stream, and dispatches to
//!   the matching codec. The offset lands just past the consumed frame, so
//!   a datagram carrying concatenated packets can be iterated.
//!
//! ## Crate Policy
//!
//! - Pure: no I/O, no logging. Callers decide what a failed decode means.
//! - Suite dispatch is an exhaustive `match` on the `Suite` enum.

pub mod ccntlv;
pub mod ndntlv;
pub mod packet;

pub use packet::{Packet, PacketType};

use repo256_core::{DecodeError, Suite};

/// Marker byte that opens an encoding-switch frame: `0x80` followed by a
/// one-byte suite tag announces the encoding of the bytes that follow.
pub const SWITCH_MARKER: u8 = 0x80;

/// Identify a suite from the first payload byte without consuming input.
///
/// NDN frames open with their packet-type TLV number (`0x05` Interest,
/// `0x06` Data); CCNx frames open with the fixed-header version `0x01`.
pub fn sniff_suite(data: &[u8]) -> Option<Suite> {
    match data.first()? {
        0x05 | 0x06 => Some(Suite::Ndn),
        0x01 => Some(Suite::Ccnx),
        _ => None,
    }
}

/// Decode one frame under a known suite, advancing `*offset` past it.
pub fn decode_with_suite(
    suite: Suite,
    data: &[u8],
    offset: &mut usize,
) -> Result<Packet, DecodeError> {
    match suite {
        Suite::Ccnx => ccntlv::decode(data, offset),
        Suite::Ndn => ndntlv::decode(data, offset),
    }
}

/// Decode the next frame starting at `*offset`.
///
/// Encoding-switch frames are consumed first; the last announcement wins.
/// Without an announcement the suite is sniffed from the payload. On
/// success `*offset` points just past the consumed frame; on error it is
/// left unchanged.
pub fn decode_frame(data: &[u8], offset: &mut usize) -> Result<Packet, DecodeError> {
    let mut pos = *offset;
    let mut announced = None;

    while pos < data.len() && data[pos] == SWITCH_MARKER {
        let tag = *data
            .get(pos + 1)
            .ok_or(DecodeError::Truncated(data.len()))?;
        announced =
            Some(Suite::from_tag(tag).ok_or(DecodeError::UnknownSuite { first_byte: tag })?);
        pos += 2;
    }

    let rest = &data[pos..];
    if rest.is_empty() {
        return Err(DecodeError::Truncated(pos));
    }
    let suite = match announced {
        Some(s) => s,
        None => sniff_suite(rest).ok_or(DecodeError::UnknownSuite {
            first_byte: rest[0],
        })?,
    };

    let mut frame_offset = pos;
    let pkt = decode_with_suite(suite, data, &mut frame_offset)?;
    *offset = frame_offset;
    Ok(pkt)
}
