//! Protocol encoding/decoding traits and checked primitive reads.
//!
//! All multi-byte primitives on this protocol are big-endian. Reads are
//! length-checked so a truncated packet fails its handler with
//! [`ProtoError::BufferTooShort`] instead of panicking.

use bytes::{Buf, BufMut};

use crate::error::ProtoError;
use crate::varint::VarInt;

/// Encode a value onto a buffer.
pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut impl BufMut);
}

/// Decode a value from a buffer.
pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

fn need(buf: &impl Buf, n: usize) -> Result<(), ProtoError> {
    if buf.remaining() < n {
        return Err(ProtoError::BufferTooShort {
            needed: n,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub fn read_u8(buf: &mut impl Buf) -> Result<u8, ProtoError> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

pub fn read_i8(buf: &mut impl Buf) -> Result<i8, ProtoError> {
    need(buf, 1)?;
    Ok(buf.get_i8())
}

pub fn read_bool(buf: &mut impl Buf) -> Result<bool, ProtoError> {
    Ok(read_u8(buf)? != 0)
}

pub fn read_i16(buf: &mut impl Buf) -> Result<i16, ProtoError> {
    need(buf, 2)?;
    Ok(buf.get_i16())
}

pub fn read_u16(buf: &mut impl Buf) -> Result<u16, ProtoError> {
    need(buf, 2)?;
    Ok(buf.get_u16())
}

pub fn read_i32(buf: &mut impl Buf) -> Result<i32, ProtoError> {
    need(buf, 4)?;
    Ok(buf.get_i32())
}

pub fn read_i64(buf: &mut impl Buf) -> Result<i64, ProtoError> {
    need(buf, 8)?;
    Ok(buf.get_i64())
}

pub fn read_u64(buf: &mut impl Buf) -> Result<u64, ProtoError> {
    need(buf, 8)?;
    Ok(buf.get_u64())
}

pub fn read_f32(buf: &mut impl Buf) -> Result<f32, ProtoError> {
    need(buf, 4)?;
    Ok(buf.get_f32())
}

pub fn read_f64(buf: &mut impl Buf) -> Result<f64, ProtoError> {
    need(buf, 8)?;
    Ok(buf.get_f64())
}

/// Skip `n` bytes, failing if the buffer holds fewer.
pub fn skip(buf: &mut impl Buf, n: usize) -> Result<(), ProtoError> {
    need(buf, n)?;
    buf.advance(n);
    Ok(())
}

/// Write a protocol string (VarInt byte length + UTF-8).
pub fn write_string(buf: &mut impl BufMut, s: &str) {
    VarInt(s.len() as i32).proto_encode(buf);
    buf.put_slice(s.as_bytes());
}

/// Read a protocol string (VarInt byte length + UTF-8).
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    let len = VarInt::proto_decode(buf)?.0;
    if len < 0 {
        return Err(ProtoError::InvalidData(format!(
            "negative string length {len}"
        )));
    }
    let len = len as usize;
    need(buf, len)?;
    let data = buf.copy_to_bytes(len);
    String::from_utf8(data.to_vec()).map_err(|_| ProtoError::InvalidUtf8)
}
