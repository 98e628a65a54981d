//! Forward-only skipper for the typed binary-tree container ("compound")
//! used by heightmaps and disconnect reasons.
//!
//! The hot chunk path only needs to know where a tree ends, so this module
//! returns offsets instead of building a parsed tree. Tag payload sizes:
//!
//! | tag | payload |
//! |-----|---------|
//! | 0   | end marker |
//! | 1/2/3/4 | 1/2/4/8 bytes |
//! | 5/6 | 4/8 bytes |
//! | 7   | i32 length L, then L bytes |
//! | 8   | u16 length L, then L bytes |
//! | 9   | u8 element type, i32 length L, L unnamed payloads |
//! | 10  | nested compound, terminated by tag 0 |
//! | 11/12 | i32 length L, then L*4 / L*8 bytes |

use crate::error::ProtoError;

const TAG_END: u8 = 0;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

fn malformed(what: &str, pos: usize) -> ProtoError {
    ProtoError::MalformedNbt(format!("{what} at offset {pos}"))
}

fn take(data: &[u8], pos: usize, n: usize) -> Result<usize, ProtoError> {
    let end = pos.checked_add(n).ok_or_else(|| malformed("overflow", pos))?;
    if end > data.len() {
        return Err(malformed("truncated payload", pos));
    }
    Ok(end)
}

fn read_u8(data: &[u8], pos: usize) -> Result<(u8, usize), ProtoError> {
    let end = take(data, pos, 1)?;
    Ok((data[pos], end))
}

fn read_u16(data: &[u8], pos: usize) -> Result<(u16, usize), ProtoError> {
    let end = take(data, pos, 2)?;
    Ok((u16::from_be_bytes([data[pos], data[pos + 1]]), end))
}

fn read_i32(data: &[u8], pos: usize) -> Result<(i32, usize), ProtoError> {
    let end = take(data, pos, 4)?;
    Ok((
        i32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]),
        end,
    ))
}

/// Skip one tag payload of the given type, returning the offset just past it.
fn skip_payload(data: &[u8], pos: usize, tag: u8) -> Result<usize, ProtoError> {
    match tag {
        1 => take(data, pos, 1),
        2 => take(data, pos, 2),
        3 | 5 => take(data, pos, 4),
        4 | 6 => take(data, pos, 8),
        TAG_BYTE_ARRAY => {
            let (len, pos) = read_i32(data, pos)?;
            if len < 0 {
                return Err(malformed("negative byte-array length", pos));
            }
            take(data, pos, len as usize)
        }
        TAG_STRING => {
            let (len, pos) = read_u16(data, pos)?;
            take(data, pos, len as usize)
        }
        TAG_LIST => {
            let (element_tag, pos) = read_u8(data, pos)?;
            let (len, mut pos) = read_i32(data, pos)?;
            if len < 0 {
                return Err(malformed("negative list length", pos));
            }
            for _ in 0..len {
                pos = skip_payload(data, pos, element_tag)?;
            }
            Ok(pos)
        }
        TAG_COMPOUND => skip_compound_body(data, pos),
        TAG_INT_ARRAY => {
            let (len, pos) = read_i32(data, pos)?;
            if len < 0 {
                return Err(malformed("negative int-array length", pos));
            }
            take(data, pos, (len as usize) * 4)
        }
        TAG_LONG_ARRAY => {
            let (len, pos) = read_i32(data, pos)?;
            if len < 0 {
                return Err(malformed("negative long-array length", pos));
            }
            take(data, pos, (len as usize) * 8)
        }
        _ => Err(malformed("unknown tag type", pos)),
    }
}

/// Skip the `(tag, name, payload)*` entries of a compound until its end tag.
fn skip_compound_body(data: &[u8], mut pos: usize) -> Result<usize, ProtoError> {
    loop {
        let (tag, next) = read_u8(data, pos)?;
        pos = next;
        if tag == TAG_END {
            return Ok(pos);
        }
        let (name_len, next) = read_u16(data, pos)?;
        pos = take(data, next, name_len as usize)?;
        pos = skip_payload(data, pos, tag)?;
    }
}

/// Skip a root whose type byte is followed by a length-prefixed name.
pub fn skip_named_root(data: &[u8]) -> Result<usize, ProtoError> {
    let (tag, pos) = read_u8(data, 0)?;
    if tag == TAG_END {
        return Ok(pos);
    }
    let (name_len, pos) = read_u16(data, pos)?;
    let pos = take(data, pos, name_len as usize)?;
    skip_payload(data, pos, tag)
}

/// Skip a root whose payload starts immediately after the type byte.
pub fn skip_nameless_root(data: &[u8]) -> Result<usize, ProtoError> {
    let (tag, pos) = read_u8(data, 0)?;
    if tag == TAG_END {
        return Ok(pos);
    }
    skip_payload(data, pos, tag)
}

/// Best-effort text rendering of a tree: concatenates every string payload
/// encountered in a nameless root. Used for disconnect reasons. Falls back
/// to a lossy UTF-8 view of the raw bytes if the tree does not parse.
pub fn extract_text(data: &[u8]) -> String {
    let mut out = String::new();
    if collect_root(data, &mut out).is_err() {
        return String::from_utf8_lossy(data).trim_matches(char::from(0)).to_string();
    }
    out
}

fn collect_root(data: &[u8], out: &mut String) -> Result<(), ProtoError> {
    let (tag, pos) = read_u8(data, 0)?;
    if tag == TAG_END {
        return Ok(());
    }
    collect_payload(data, pos, tag, out).map(|_| ())
}

fn collect_payload(
    data: &[u8],
    pos: usize,
    tag: u8,
    out: &mut String,
) -> Result<usize, ProtoError> {
    match tag {
        TAG_STRING => {
            let (len, pos) = read_u16(data, pos)?;
            let end = take(data, pos, len as usize)?;
            if let Ok(s) = std::str::from_utf8(&data[pos..end]) {
                out.push_str(s);
            }
            Ok(end)
        }
        TAG_LIST => {
            let (element_tag, pos) = read_u8(data, pos)?;
            let (len, mut pos) = read_i32(data, pos)?;
            if len < 0 {
                return Err(malformed("negative list length", pos));
            }
            for _ in 0..len {
                pos = collect_payload(data, pos, element_tag, out)?;
            }
            Ok(pos)
        }
        TAG_COMPOUND => {
            let mut pos = pos;
            loop {
                let (tag, next) = read_u8(data, pos)?;
                pos = next;
                if tag == TAG_END {
                    return Ok(pos);
                }
                let (name_len, next) = read_u16(data, pos)?;
                pos = take(data, next, name_len as usize)?;
                pos = collect_payload(data, pos, tag, out)?;
            }
        }
        _ => skip_payload(data, pos, tag),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
