//! Server-authoritative position sync and its acknowledgement.

use bytes::{Buf, BufMut};

use crate::codec::{read_f32, read_f64, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::Vec3;
use crate::varint::VarInt;

/// SynchronizePosition — Server → Client. Must be answered with
/// [`ConfirmTeleport`] carrying the same id.
#[derive(Debug, Clone, Copy)]
pub struct SynchronizePosition {
    pub teleport_id: i32,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl ProtoDecode for SynchronizePosition {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let teleport_id = VarInt::proto_decode(buf)?.0;
        let position = Vec3::new(read_f64(buf)?, read_f64(buf)?, read_f64(buf)?);
        let velocity = Vec3::new(read_f64(buf)?, read_f64(buf)?, read_f64(buf)?);
        let yaw = read_f32(buf)?;
        let pitch = read_f32(buf)?;
        Ok(Self {
            teleport_id,
            position,
            velocity,
            yaw,
            pitch,
        })
    }
}

/// ConfirmTeleport — Client → Server.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmTeleport {
    pub teleport_id: i32,
}

impl ProtoEncode for ConfirmTeleport {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.teleport_id).proto_encode(buf);
    }
}
