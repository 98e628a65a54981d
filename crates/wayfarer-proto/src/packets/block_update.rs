//! BlockUpdate — Server → Client. Single-cell change.

use bytes::Buf;

use crate::codec::{read_u64, ProtoDecode};
use crate::error::ProtoError;
use crate::types::BlockPos;
use crate::varint::VarInt;

/// Cell positions travel packed into one u64: x and z in 26 signed bits,
/// y in 12.
pub fn unpack_position(packed: u64) -> BlockPos {
    let x = (packed as i64 >> 38) as i32;
    let y = ((packed as i64) << 52 >> 52) as i32;
    let z = ((packed as i64) << 26 >> 38) as i32;
    BlockPos::new(x, y, z)
}

#[derive(Debug, Clone, Copy)]
pub struct BlockUpdate {
    pub pos: BlockPos,
    pub state: i32,
}

impl ProtoDecode for BlockUpdate {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let pos = unpack_position(read_u64(buf)?);
        let state = VarInt::proto_decode(buf)?.0;
        Ok(Self { pos, state })
    }
}
