//! # NDN TLV Codec
//!
//! Standard NDN packet format: varint type and length numbers, top-level
//! `0x05` Interest / `0x06` Data. An `ImplicitSha256DigestComponent` as the
//! final Interest name component is the digest restriction; it is stripped
//! from the name bytes, so a one-component digest name decodes as a pure
//! by-digest request. The packet digest covers the whole frame.

use repo256_core::{DecodeError, Digest, Suite, DIGEST_LEN};

use crate::packet::{Packet, PacketType};

const TT_IMPLICIT_DIGEST: u64 = 0x01;
const TT_INTEREST: u64 = 0x05;
const TT_DATA: u64 = 0x06;
const TT_NAME: u64 = 0x07;
const TT_GENERIC_COMPONENT: u64 = 0x08;
const TT_CONTENT: u64 = 0x15;

/// Encoded size of an implicit digest component TLV.
const IMPLICIT_DIGEST_TLV_LEN: usize = 2 + DIGEST_LEN;

/// Read one NDN varint number (1, 3, 5 or 9 bytes) at `*pos`.
fn read_varnum(buf: &[u8], pos: &mut usize) -> Result<u64, DecodeError> {
    let first = *buf.get(*pos).ok_or(DecodeError::Truncated(*pos))?;
    *pos += 1;
    let extra = match first {
        0..=252 => return Ok(u64::from(first)),
        253 => 2,
        254 => 4,
        255 => 8,
    };
    let bytes = buf
        .get(*pos..*pos + extra)
        .ok_or(DecodeError::Truncated(buf.len()))?;
    *pos += extra;
    let mut n: u64 = 0;
    for b in bytes {
        n = (n << 8) | u64::from(*b);
    }
    Ok(n)
}

fn write_varnum(out: &mut Vec<u8>, n: u64) {
    if n <= 252 {
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(253);
        out.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        out.push(254);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        out.push(255);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

/// Read one TLV head at `*pos`, returning the type and value length;
/// `*pos` advances to the start of the value.
fn read_tlv_head(buf: &[u8], pos: &mut usize) -> Result<(u64, usize), DecodeError> {
    let t = read_varnum(buf, pos)?;
    let l = read_varnum(buf, pos)? as usize;
    if buf.len() < *pos + l {
        return Err(DecodeError::Truncated(buf.len()));
    }
    Ok((t, l))
}

fn put_tlv(out: &mut Vec<u8>, t: u64, value: &[u8]) {
    write_varnum(out, t);
    write_varnum(out, value.len() as u64);
    out.extend_from_slice(value);
}

/// Split a name TLV value into its components, checking structure.
fn name_components(value: &[u8]) -> Result<Vec<(u64, usize, usize)>, DecodeError> {
    let mut pos = 0;
    let mut out = Vec::new();
    while pos < value.len() {
        let head = pos;
        let (t, l) = read_tlv_head(value, &mut pos)?;
        out.push((t, head, pos + l));
        pos += l;
    }
    Ok(out)
}

/// Decode one NDN frame starting at `*offset`, advancing the offset past
/// the consumed frame.
pub fn decode(data: &[u8], offset: &mut usize) -> Result<Packet, DecodeError> {
    let start = *offset;
    let buf = &data[start..];
    let mut pos = 0;
    let (t, l) = read_tlv_head(buf, &mut pos)?;
    let ptype = match t {
        TT_INTEREST => PacketType::Interest,
        TT_DATA => PacketType::Content,
        _ => return Err(DecodeError::BadTlv("packet type")),
    };
    let frame = &buf[..pos + l];
    let body = &frame[pos..];

    // Walk the packet body for the name; tolerate and skip everything else
    // (nonce, meta info, content, signature).
    let mut name_value: Option<&[u8]> = None;
    let mut bpos = 0;
    while bpos < body.len() {
        let (t, l) = read_tlv_head(body, &mut bpos)?;
        if t == TT_NAME && name_value.is_none() {
            name_value = Some(&body[bpos..bpos + l]);
        }
        bpos += l;
    }

    let mut name = None;
    let mut digest_restriction = None;
    match (ptype, name_value) {
        (PacketType::Interest, None) => return Err(DecodeError::BadTlv("interest name")),
        (PacketType::Interest, Some(value)) => {
            let comps = name_components(value)?;
            let mut name_end = value.len();
            if let Some(&(t, head, end)) = comps.last() {
                if t == TT_IMPLICIT_DIGEST && end == value.len() {
                    let comp = &value[head..end];
                    if comp.len() != IMPLICIT_DIGEST_TLV_LEN {
                        return Err(DecodeError::BadTlv("implicit digest"));
                    }
                    let mut d = [0u8; DIGEST_LEN];
                    d.copy_from_slice(&comp[2..]);
                    digest_restriction = Some(Digest::from_bytes(d));
                    name_end = head;
                }
            }
            if name_end > 0 {
                name = Some(value[..name_end].to_vec());
            }
        }
        (PacketType::Content, value) => {
            if let Some(value) = value {
                name_components(value)?;
                if !value.is_empty() {
                    name = Some(value.to_vec());
                }
            }
        }
    }

    *offset = start + frame.len();
    Ok(Packet {
        ptype,
        suite: Suite::Ndn,
        name,
        digest_restriction,
        digest: Digest::of(frame),
        bytes: frame.to_vec(),
    })
}

/// Encode name components as generic component TLVs (the name TLV value).
pub fn encode_name(components: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for c in components {
        put_tlv(&mut out, TT_GENERIC_COMPONENT, c);
    }
    out
}

/// Encode an Interest. A digest restriction becomes the final implicit
/// digest name component.
pub fn encode_interest(components: &[&[u8]], restriction: Option<&Digest>) -> Vec<u8> {
    let mut name_value = encode_name(components);
    if let Some(d) = restriction {
        put_tlv(&mut name_value, TT_IMPLICIT_DIGEST, d.as_bytes());
    }
    let mut body = Vec::new();
    put_tlv(&mut body, TT_NAME, &name_value);

    let mut out = Vec::new();
    put_tlv(&mut out, TT_INTEREST, &body);
    out
}

/// Encode a Data packet with an optional name and a payload.
pub fn encode_content(components: &[&[u8]], payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    put_tlv(&mut body, TT_NAME, &encode_name(components));
    put_tlv(&mut body, TT_CONTENT, payload);

    let mut out = Vec::new();
    put_tlv(&mut out, TT_DATA, &body);
    out
}
