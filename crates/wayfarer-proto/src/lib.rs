//! Wire layer for the Java-edition voxel protocol: variable-length integer
//! codecs, length-prefixed (optionally zlib-compressed) framing, primitive
//! reads/writes over packet buffers, an allocation-free NBT skipper, and the
//! packet definitions the headless client speaks.

pub mod codec;
pub mod error;
pub mod frame;
pub mod nbt;
pub mod packets;
pub mod types;
pub mod varint;

pub use codec::{ProtoDecode, ProtoEncode};
pub use error::ProtoError;
pub use frame::FrameCodec;
pub use types::{BlockPos, ChunkPos, Uuid, Vec3};
pub use varint::{VarInt, VarLong};
