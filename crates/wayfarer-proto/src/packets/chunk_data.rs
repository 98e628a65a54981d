//! Chunk load/unload packets.

use bytes::{Buf, Bytes};

use crate::codec::{read_i32, ProtoDecode};
use crate::error::ProtoError;
use crate::types::ChunkPos;

/// ChunkData — Server → Client. Column coordinates followed by the opaque
/// body (heightmaps tree, section data, block entities, lighting), which the
/// world crate decodes.
#[derive(Debug, Clone)]
pub struct ChunkData {
    pub pos: ChunkPos,
    pub body: Bytes,
}

impl ProtoDecode for ChunkData {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let x = read_i32(buf)?;
        let z = read_i32(buf)?;
        let body = buf.copy_to_bytes(buf.remaining());
        Ok(Self {
            pos: ChunkPos::new(x, z),
            body,
        })
    }
}

/// UnloadChunk — Server → Client. Note the Z-before-X field order.
#[derive(Debug, Clone, Copy)]
pub struct UnloadChunk {
    pub pos: ChunkPos,
}

impl ProtoDecode for UnloadChunk {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let z = read_i32(buf)?;
        let x = read_i32(buf)?;
        Ok(Self {
            pos: ChunkPos::new(x, z),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn chunk_data_splits_coords_and_body() {
        let mut buf = BytesMut::new();
        buf.put_i32(3);
        buf.put_i32(-7);
        buf.put_slice(&[0xAB, 0xCD, 0xEF]);
        let pkt = ChunkData::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.pos, ChunkPos::new(3, -7));
        assert_eq!(&pkt.body[..], &[0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn unload_chunk_is_z_then_x() {
        let mut buf = BytesMut::new();
        buf.put_i32(-7); // z
        buf.put_i32(3); // x
        let pkt = UnloadChunk::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.pos, ChunkPos::new(3, -7));
    }
}
