//! Health updates and the respawn request.

use bytes::{Buf, BufMut};

use crate::codec::{read_f32, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::varint::VarInt;

/// SetHealth — Server → Client.
#[derive(Debug, Clone, Copy)]
pub struct SetHealth {
    pub health: f32,
    pub food: i32,
    pub saturation: f32,
}

impl ProtoDecode for SetHealth {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let health = read_f32(buf)?;
        let food = VarInt::proto_decode(buf)?.0;
        let saturation = read_f32(buf)?;
        Ok(Self {
            health,
            food,
            saturation,
        })
    }
}

/// ClientStatus — Client → Server. Action 0 requests a respawn; sent when
/// health reaches zero.
#[derive(Debug, Clone, Copy)]
pub struct ClientStatus {
    pub action: i32,
}

impl ClientStatus {
    pub fn respawn() -> Self {
        Self { action: 0 }
    }
}

impl ProtoEncode for ClientStatus {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.action).proto_encode(buf);
    }
}
