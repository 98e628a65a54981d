//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt encoding error: {0}")]
    VarInt(#[from] crate::varint::VarIntError),

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("frame length {0} is negative or oversized")]
    BadFrameLength(i32),

    #[error("decompression error: {0}")]
    Decompress(String),

    #[error("compression error: {0}")]
    Compress(String),

    #[error("uncompressed length mismatch: envelope says {expected}, inflated {got}")]
    InflatedLengthMismatch { expected: usize, got: usize },

    #[error("malformed NBT: {0}")]
    MalformedNbt(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
