//! Entity spawn/move/remove packets consumed by the tracker.

use bytes::Buf;

use crate::codec::{read_bool, read_f64, read_i16, read_u8, skip, ProtoDecode};
use crate::error::ProtoError;
use crate::types::{Uuid, Vec3};
use crate::varint::VarInt;

/// Divisor converting the packed i16 delta units to blocks.
pub const DELTA_UNITS_PER_BLOCK: f64 = 4096.0;

/// SpawnEntity — Server → Client.
#[derive(Debug, Clone)]
pub struct SpawnEntity {
    pub entity_id: i32,
    pub uuid: Uuid,
    pub entity_type: i32,
    pub position: Vec3,
}

impl ProtoDecode for SpawnEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let uuid = Uuid::proto_decode(buf)?;
        let entity_type = VarInt::proto_decode(buf)?.0;
        let position = Vec3::new(read_f64(buf)?, read_f64(buf)?, read_f64(buf)?);
        // pitch, yaw, head yaw angles
        skip(buf, 3)?;
        let _data = VarInt::proto_decode(buf)?;
        // initial velocity, 3 x i16
        skip(buf, 6)?;
        Ok(Self {
            entity_id,
            uuid,
            entity_type,
            position,
        })
    }
}

/// UpdateEntityPosition — Server → Client. Delta-encoded move.
#[derive(Debug, Clone, Copy)]
pub struct UpdateEntityPosition {
    pub entity_id: i32,
    pub delta: Vec3,
    pub on_ground: bool,
}

fn read_delta(buf: &mut impl Buf) -> Result<Vec3, ProtoError> {
    let dx = read_i16(buf)? as f64 / DELTA_UNITS_PER_BLOCK;
    let dy = read_i16(buf)? as f64 / DELTA_UNITS_PER_BLOCK;
    let dz = read_i16(buf)? as f64 / DELTA_UNITS_PER_BLOCK;
    Ok(Vec3::new(dx, dy, dz))
}

impl ProtoDecode for UpdateEntityPosition {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let delta = read_delta(buf)?;
        let on_ground = read_bool(buf)?;
        Ok(Self {
            entity_id,
            delta,
            on_ground,
        })
    }
}

/// UpdateEntityPositionRotation — Server → Client.
#[derive(Debug, Clone, Copy)]
pub struct UpdateEntityPositionRotation {
    pub entity_id: i32,
    pub delta: Vec3,
    pub yaw: u8,
    pub pitch: u8,
    pub on_ground: bool,
}

impl ProtoDecode for UpdateEntityPositionRotation {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let delta = read_delta(buf)?;
        let yaw = read_u8(buf)?;
        let pitch = read_u8(buf)?;
        let on_ground = read_bool(buf)?;
        Ok(Self {
            entity_id,
            delta,
            yaw,
            pitch,
            on_ground,
        })
    }
}

/// TeleportEntity — Server → Client. Absolute reposition.
#[derive(Debug, Clone, Copy)]
pub struct TeleportEntity {
    pub entity_id: i32,
    pub position: Vec3,
}

impl ProtoDecode for TeleportEntity {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = VarInt::proto_decode(buf)?.0;
        let position = Vec3::new(read_f64(buf)?, read_f64(buf)?, read_f64(buf)?);
        // yaw, pitch, on-ground
        skip(buf, 3)?;
        Ok(Self {
            entity_id,
            position,
        })
    }
}

/// RemoveEntities — Server → Client.
#[derive(Debug, Clone)]
pub struct RemoveEntities {
    pub entity_ids: Vec<i32>,
}

impl ProtoDecode for RemoveEntities {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let count = VarInt::proto_decode(buf)?.0;
        if count < 0 {
            return Err(ProtoError::InvalidData(format!(
                "negative entity count {count}"
            )));
        }
        let mut entity_ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            entity_ids.push(VarInt::proto_decode(buf)?.0);
        }
        Ok(Self { entity_ids })
    }
}
