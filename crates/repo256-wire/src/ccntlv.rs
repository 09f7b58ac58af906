//! # CCNx TLV Codec
//!
//! An RFC 8609-shaped subset: an 8-byte fixed header followed by one
//! message TLV with 16-bit types and lengths. The packet digest covers the
//! message portion only (everything after the fixed header), which is what
//! a CCNx hash restriction refers to.
//!
//! Decoding is strict about structure (bounds, version, header length) and
//! permissive about content: unknown nested TLVs are skipped.

use repo256_core::{DecodeError, Digest, Suite, DIGEST_LEN};

use crate::packet::{Packet, PacketType};

pub const VERSION: u8 = 0x01;
pub const FIXED_HEADER_LEN: usize = 8;

const PT_INTEREST: u8 = 0x00;
const PT_CONTENT: u8 = 0x01;

const T_NAME: u16 = 0x0000;
const T_INTEREST: u16 = 0x0001;
const T_OBJECT: u16 = 0x0002;
const T_NAMESEGMENT: u16 = 0x0001;
const T_PAYLOAD: u16 = 0x0001;
const T_OBJHASHRESTR: u16 = 0x0003;

const DEFAULT_HOP_LIMIT: u8 = 64;

/// Read one 16-bit type / 16-bit length TLV from the front of `buf`.
/// Returns (type, value, rest). `pos` is the absolute offset of `buf`,
/// used only for error reporting.
fn read_tlv(buf: &[u8], pos: usize) -> Result<(u16, &[u8], &[u8]), DecodeError> {
    if buf.len() < 4 {
        return Err(DecodeError::Truncated(pos + buf.len()));
    }
    let t = u16::from_be_bytes([buf[0], buf[1]]);
    let l = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    if buf.len() < 4 + l {
        return Err(DecodeError::Truncated(pos + buf.len()));
    }
    Ok((t, &buf[4..4 + l], &buf[4 + l..]))
}

fn put_tlv(out: &mut Vec<u8>, t: u16, value: &[u8]) {
    out.extend_from_slice(&t.to_be_bytes());
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value);
}

/// Check that a name TLV value is a well-formed run of segment TLVs.
fn validate_name(mut body: &[u8], pos: usize) -> Result<(), DecodeError> {
    while !body.is_empty() {
        let (_, _, rest) = read_tlv(body, pos)?;
        body = rest;
    }
    Ok(())
}

/// Decode one CCNx frame starting at `*offset`, advancing the offset past
/// the consumed frame.
pub fn decode(data: &[u8], offset: &mut usize) -> Result<Packet, DecodeError> {
    let start = *offset;
    let buf = &data[start..];
    if buf.len() < FIXED_HEADER_LEN {
        return Err(DecodeError::Truncated(start + buf.len()));
    }
    if buf[0] != VERSION {
        return Err(DecodeError::BadVersion(buf[0]));
    }
    let pt = buf[1];
    let plen = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    let hdrlen = buf[7] as usize;
    if hdrlen < FIXED_HEADER_LEN || plen < hdrlen {
        return Err(DecodeError::BadTlv("fixed header"));
    }
    if buf.len() < plen {
        return Err(DecodeError::Truncated(start + buf.len()));
    }

    let frame = &buf[..plen];
    let message = &frame[hdrlen..];
    let (t, body, rest) = read_tlv(message, start + hdrlen)?;
    if !rest.is_empty() {
        return Err(DecodeError::BadTlv("message"));
    }
    let ptype = match (pt, t) {
        (PT_INTEREST, T_INTEREST) => PacketType::Interest,
        (PT_CONTENT, T_OBJECT) => PacketType::Content,
        _ => return Err(DecodeError::BadTlv("message type")),
    };

    let mut name = None;
    let mut digest_restriction = None;
    let mut fields = body;
    while !fields.is_empty() {
        let (t, value, rest) = read_tlv(fields, start + hdrlen)?;
        match t {
            T_NAME => {
                validate_name(value, start + hdrlen)?;
                if !value.is_empty() {
                    name = Some(value.to_vec());
                }
            }
            T_OBJHASHRESTR if ptype == PacketType::Interest => {
                if value.len() != DIGEST_LEN {
                    return Err(DecodeError::BadTlv("hash restriction"));
                }
                let mut d = [0u8; DIGEST_LEN];
                d.copy_from_slice(value);
                digest_restriction = Some(Digest::from_bytes(d));
            }
            _ => {}
        }
        fields = rest;
    }

    *offset = start + plen;
    Ok(Packet {
        ptype,
        suite: Suite::Ccnx,
        name,
        digest_restriction,
        digest: Digest::of(message),
        bytes: frame.to_vec(),
    })
}

/// Encode name components as a run of segment TLVs (the name TLV value).
pub fn encode_name(components: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for c in components {
        put_tlv(&mut out, T_NAMESEGMENT, c);
    }
    out
}

fn encode_packet(pt: u8, t: u16, fields: Vec<u8>) -> Vec<u8> {
    let mut message = Vec::with_capacity(4 + fields.len());
    put_tlv(&mut message, t, &fields);

    let plen = (FIXED_HEADER_LEN + message.len()) as u16;
    let mut out = Vec::with_capacity(plen as usize);
    out.extend_from_slice(&[VERSION, pt]);
    out.extend_from_slice(&plen.to_be_bytes());
    out.extend_from_slice(&[DEFAULT_HOP_LIMIT, 0, 0, FIXED_HEADER_LEN as u8]);
    out.extend_from_slice(&message);
    out
}

/// Encode an Interest with an optional name and an optional hash
/// restriction.
pub fn encode_interest(components: &[&[u8]], restriction: Option<&Digest>) -> Vec<u8> {
    let mut fields = Vec::new();
    if !components.is_empty() {
        put_tlv(&mut fields, T_NAME, &encode_name(components));
    }
    if let Some(d) = restriction {
        put_tlv(&mut fields, T_OBJHASHRESTR, d.as_bytes());
    }
    encode_packet(PT_INTEREST, T_INTEREST, fields)
}

/// Encode a Content object with an optional name and a payload.
pub fn encode_content(components: &[&[u8]], payload: &[u8]) -> Vec<u8> {
    let mut fields = Vec::new();
    if !components.is_empty() {
        put_tlv(&mut fields, T_NAME, &encode_name(components));
    }
    put_tlv(&mut fields, T_PAYLOAD, payload);
    encode_packet(PT_CONTENT, T_OBJECT, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_round_trip() {
        let frame = encode_content(&[b"a", b"b"], b"hello repo");
        let mut offset = 0;
        let pkt = decode(&frame, &mut offset).unwrap();

        assert_eq!(offset, frame.len());
        assert_eq!(pkt.ptype, PacketType::Content);
        assert_eq!(pkt.suite, Suite::Ccnx);
        assert_eq!(pkt.name.as_deref(), Some(&encode_name(&[b"a", b"b"])[..]));
        assert_eq!(pkt.digest_restriction, None);
        assert_eq!(pkt.bytes, frame);
        assert_eq!(pkt.digest, Digest::of(&frame[FIXED_HEADER_LEN..]));
    }

    #[test]
    fn test_nameless_content() {
        let frame = encode_content(&[], b"payload only");
        let mut offset = 0;
        let pkt = decode(&frame, &mut offset).unwrap();
        assert_eq!(pkt.name, None);
    }

    #[test]
    fn test_interest_with_hash_restriction() {
        let d = Digest::of(b"the object");
        let frame = encode_interest(&[], Some(&d));
        let mut offset = 0;
        let pkt = decode(&frame, &mut offset).unwrap();

        assert_eq!(pkt.ptype, PacketType::Interest);
        assert_eq!(pkt.name, None);
        assert_eq!(pkt.digest_restriction, Some(d));
    }

    #[test]
    fn test_interest_by_name() {
        let frame = encode_interest(&[b"news", b"today"], None);
        let mut offset = 0;
        let pkt = decode(&frame, &mut offset).unwrap();

        assert_eq!(pkt.ptype, PacketType::Interest);
        assert_eq!(
            pkt.name.as_deref(),
            Some(&encode_name(&[b"news", b"today"])[..])
        );
        assert_eq!(pkt.digest_restriction, None);
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut frame = encode_content(&[], b"x");
        frame[0] = 0x02;
        let mut offset = 0;
        assert_eq!(
            decode(&frame, &mut offset),
            Err(DecodeError::BadVersion(0x02))
        );
        assert_eq!(offset, 0);
    }

    #[test]
    fn test_truncated_frame_rejected() {
        let frame = encode_content(&[b"a"], b"payload");
        let mut offset = 0;
        assert!(matches!(
            decode(&frame[..frame.len() - 1], &mut offset),
            Err(DecodeError::Truncated(_))
        ));
    }

    #[test]
    fn test_bad_restriction_length_rejected() {
        // Hand-build an Interest whose restriction TLV is 31 bytes.
        let mut fields = Vec::new();
        put_tlv(&mut fields, T_OBJHASHRESTR, &[0u8; 31]);
        let frame = encode_packet(PT_INTEREST, T_INTEREST, fields);
        let mut offset = 0;
        assert_eq!(
            decode(&frame, &mut offset),
            Err(DecodeError::BadTlv("hash restriction"))
        );
    }

    #[test]
    fn test_concatenated_frames_advance_offset() {
        let a = encode_content(&[], b"first");
        let b = encode_content(&[], b"second");
        let mut data = a.clone();
        data.extend_from_slice(&b);

        let mut offset = 0;
        let first = decode(&data, &mut offset).unwrap();
        assert_eq!(offset, a.len());
        let second = decode(&data, &mut offset).unwrap();
        assert_eq!(offset, data.len());
        assert_eq!(first.bytes, a);
        assert_eq!(second.bytes, b);
    }

    #[test]
    fn test_digest_ignores_fixed_header_mutation() {
        // The hop limit byte is outside the digest coverage.
        let mut frame = encode_content(&[], b"covered");
        let mut offset = 0;
        let before = decode(&frame, &mut offset).unwrap();

        frame[4] = 1;
        offset = 0;
        let after = decode(&frame, &mut offset).unwrap();
        assert_eq!(before.digest, after.digest);
    }
}
