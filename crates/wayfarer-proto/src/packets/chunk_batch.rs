//! Chunk batch acknowledgement.

use bytes::BufMut;

use crate::codec::ProtoEncode;

/// ChunkBatchReceived — Client → Server. Sent after a chunk-batch-finished
/// packet with the rate the client is willing to accept.
#[derive(Debug, Clone, Copy)]
pub struct ChunkBatchReceived {
    pub chunks_per_tick: f32,
}

impl Default for ChunkBatchReceived {
    fn default() -> Self {
        Self {
            chunks_per_tick: 20.0,
        }
    }
}

impl ProtoEncode for ChunkBatchReceived {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f32(self.chunks_per_tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn default_rate_is_twenty() {
        let mut buf = BytesMut::new();
        ChunkBatchReceived::default().proto_encode(&mut buf);
        assert_eq!(&buf[..], &20.0f32.to_be_bytes());
    }
}
