//! SetPlayerPositionRotation — Client → Server.

use bytes::BufMut;

use crate::codec::ProtoEncode;
use crate::types::Vec3;

/// The client's own movement report, sent once per motion tick while moving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetPlayerPositionRotation {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl ProtoEncode for SetPlayerPositionRotation {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_f64(self.position.x);
        buf.put_f64(self.position.y);
        buf.put_f64(self.position.z);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        buf.put_u8(self.on_ground as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn layout_is_3xf64_2xf32_bool() {
        let pkt = SetPlayerPositionRotation {
            position: Vec3::new(1.5, 64.0, -2.5),
            yaw: 180.0,
            pitch: 0.0,
            on_ground: true,
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf.len(), 8 * 3 + 4 * 2 + 1);
        assert_eq!(&buf[..8], &1.5f64.to_be_bytes());
        assert_eq!(buf[32], 1);
    }
}
