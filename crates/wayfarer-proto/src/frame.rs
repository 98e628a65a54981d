//! Length-prefixed frame codec with the optional zlib compression envelope.
//!
//! A frame on the wire is `VarInt total_len` followed by `total_len` bytes.
//! Before the server enables compression those bytes are
//! `VarInt packet_id + body`. Afterwards they are
//! `VarInt uncompressed_len + deflate(packet_id + body)`, where an
//! `uncompressed_len` of zero marks a payload that was left uncompressed.

use std::io::{Read, Write};

use bytes::{Buf, Bytes, BytesMut};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::varint::{VarInt, VarIntError};

/// Frames larger than this are treated as a protocol violation.
const MAX_FRAME_LEN: i32 = 8 * 1024 * 1024;

/// Encoder/decoder for the framed transport. Holds the negotiated
/// compression threshold and the inbound reassembly buffer.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// `None` until the server sends set-compression with a nonnegative
    /// threshold. A threshold of 0 compresses every outbound payload.
    threshold: Option<i32>,
    inbound: BytesMut,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the compression envelope. Negative thresholds keep it off,
    /// matching the server's "disable" convention.
    pub fn enable_compression(&mut self, threshold: i32) {
        self.threshold = (threshold >= 0).then_some(threshold);
    }

    pub fn compression_enabled(&self) -> bool {
        self.threshold.is_some()
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Frame a packet for the wire.
    pub fn encode(&self, packet_id: i32, body: &[u8]) -> Result<Bytes, ProtoError> {
        let mut inner = Vec::with_capacity(body.len() + VarInt::MAX_BYTES);
        VarInt(packet_id).encode(&mut inner);
        inner.extend_from_slice(body);

        let payload = match self.threshold {
            Some(threshold) if inner.len() as i32 >= threshold => {
                let mut out = Vec::new();
                VarInt(inner.len() as i32).encode(&mut out);
                let mut encoder = ZlibEncoder::new(out, Compression::default());
                encoder
                    .write_all(&inner)
                    .map_err(|e| ProtoError::Compress(e.to_string()))?;
                encoder
                    .finish()
                    .map_err(|e| ProtoError::Compress(e.to_string()))?
            }
            Some(_) => {
                // Below threshold: still inside the envelope, marked plain.
                let mut out = Vec::with_capacity(inner.len() + 1);
                VarInt(0).encode(&mut out);
                out.extend_from_slice(&inner);
                out
            }
            None => inner,
        };

        let mut frame = Vec::with_capacity(payload.len() + VarInt::MAX_BYTES);
        VarInt(payload.len() as i32).encode(&mut frame);
        frame.extend_from_slice(&payload);
        Ok(Bytes::from(frame))
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Append raw socket bytes to the reassembly buffer.
    pub fn feed(&mut self, data: &[u8]) {
        self.inbound.extend_from_slice(data);
    }

    /// Pop the next complete frame, returning `(packet_id, body)`.
    ///
    /// Returns `Ok(None)` while the buffer holds only a partial frame.
    /// A varint overflow in the length prefix is fatal for the connection.
    pub fn next_frame(&mut self) -> Result<Option<(i32, Bytes)>, ProtoError> {
        let (len, header) = match VarInt::decode(&self.inbound) {
            Ok((v, n)) => (v.0, n),
            Err(VarIntError::BufferTooShort) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !(0..=MAX_FRAME_LEN).contains(&len) {
            return Err(ProtoError::BadFrameLength(len));
        }
        let len = len as usize;
        if self.inbound.len() < header + len {
            return Ok(None);
        }
        self.inbound.advance(header);
        let frame = self.inbound.split_to(len).freeze();

        let mut payload = if self.threshold.is_some() {
            let mut frame = frame;
            let uncompressed_len = VarInt::proto_decode(&mut frame)?.0;
            if uncompressed_len == 0 {
                frame
            } else {
                let mut inflated = Vec::with_capacity(uncompressed_len as usize);
                ZlibDecoder::new(&frame[..])
                    .read_to_end(&mut inflated)
                    .map_err(|e| ProtoError::Decompress(e.to_string()))?;
                if inflated.len() != uncompressed_len as usize {
                    return Err(ProtoError::InflatedLengthMismatch {
                        expected: uncompressed_len as usize,
                        got: inflated.len(),
                    });
                }
                Bytes::from(inflated)
            }
        } else {
            frame
        };

        let packet_id = VarInt::proto_decode(&mut payload)?.0;
        Ok(Some((packet_id, payload)))
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(codec_out: &FrameCodec, codec_in: &mut FrameCodec, id: i32, body: &[u8]) {
        let wire = codec_out.encode(id, body).unwrap();
        codec_in.feed(&wire);
        let (got_id, got_body) = codec_in.next_frame().unwrap().unwrap();
        assert_eq!(got_id, id);
        assert_eq!(&got_body[..], body);
        assert!(codec_in.next_frame().unwrap().is_none());
    }

    #[test]
    fn frame_roundtrip_uncompressed() {
        let tx = FrameCodec::new();
        let mut rx = FrameCodec::new();
        roundtrip(&tx, &mut rx, 0x00, b"");
        roundtrip(&tx, &mut rx, 0x1B, b"hello");
        roundtrip(&tx, &mut rx, 0x42, &[0u8; 300]);
    }

    #[test]
    fn frame_roundtrip_compressed_above_threshold() {
        let mut tx = FrameCodec::new();
        let mut rx = FrameCodec::new();
        tx.enable_compression(16);
        rx.enable_compression(16);
        let body = vec![7u8; 512];
        let wire = tx.encode(0x28, &body).unwrap();
        // The deflated frame must be smaller than the raw body.
        assert!(wire.len() < body.len());
        rx.feed(&wire);
        let (id, got) = rx.next_frame().unwrap().unwrap();
        assert_eq!(id, 0x28);
        assert_eq!(got[..], body[..]);
    }

    #[test]
    fn frame_roundtrip_below_threshold_stays_plain() {
        let mut tx = FrameCodec::new();
        let mut rx = FrameCodec::new();
        tx.enable_compression(256);
        rx.enable_compression(256);
        roundtrip(&tx, &mut rx, 0x05, b"tiny");
    }

    #[test]
    fn threshold_zero_compresses_everything() {
        let mut tx = FrameCodec::new();
        let mut rx = FrameCodec::new();
        tx.enable_compression(0);
        rx.enable_compression(0);
        roundtrip(&tx, &mut rx, 0x00, b"");
        roundtrip(&tx, &mut rx, 0x01, b"x");
        roundtrip(&tx, &mut rx, 0x02, &[9u8; 1000]);
    }

    #[test]
    fn negative_threshold_disables() {
        let mut codec = FrameCodec::new();
        codec.enable_compression(128);
        assert!(codec.compression_enabled());
        codec.enable_compression(-1);
        assert!(!codec.compression_enabled());
    }

    #[test]
    fn reassembly_from_arbitrary_chunking() {
        let tx = FrameCodec::new();
        let frames: Vec<(i32, Vec<u8>)> = vec![
            (0x00, vec![]),
            (0x1B, b"keepalive".to_vec()),
            (0x28, vec![3u8; 700]),
            (0x42, (0..=255u8).collect()),
        ];
        let mut stream = Vec::new();
        for (id, body) in &frames {
            stream.extend_from_slice(&tx.encode(*id, body).unwrap());
        }

        // Feed the concatenated stream in every chunk size from 1 to 17 and
        // expect the identical frame sequence each time.
        for chunk_size in 1..=17 {
            let mut rx = FrameCodec::new();
            let mut out = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                rx.feed(chunk);
                while let Some((id, body)) = rx.next_frame().unwrap() {
                    out.push((id, body.to_vec()));
                }
            }
            assert_eq!(out, frames, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn partial_frame_returns_none() {
        let tx = FrameCodec::new();
        let wire = tx.encode(0x07, b"partial-frame-body").unwrap();
        let mut rx = FrameCodec::new();
        rx.feed(&wire[..wire.len() - 1]);
        assert!(rx.next_frame().unwrap().is_none());
        rx.feed(&wire[wire.len() - 1..]);
        assert!(rx.next_frame().unwrap().is_some());
    }

    #[test]
    fn length_varint_overflow_is_fatal() {
        let mut rx = FrameCodec::new();
        rx.feed(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(rx.next_frame().is_err());
    }

    #[test]
    fn negative_frame_length_is_fatal() {
        let mut rx = FrameCodec::new();
        let mut wire = Vec::new();
        VarInt(-5).encode(&mut wire);
        rx.feed(&wire);
        assert!(matches!(
            rx.next_frame(),
            Err(ProtoError::BadFrameLength(-5))
        ));
    }

    #[test]
    fn inflated_length_mismatch_detected() {
        let mut tx = FrameCodec::new();
        tx.enable_compression(0);
        let wire = tx.encode(0x01, b"mismatch-me-please").unwrap();

        // Corrupt the envelope's uncompressed-length varint (first payload
        // byte after the frame length prefix).
        let mut bad = wire.to_vec();
        let (_, header) = VarInt::decode(&bad).unwrap();
        bad[header] = bad[header].wrapping_add(1);

        let mut rx = FrameCodec::new();
        rx.enable_compression(0);
        rx.feed(&bad);
        assert!(rx.next_frame().is_err());
    }
}
