//! Login-state packets: login-start, login-success, set-compression,
//! login-acknowledged.

use bytes::{Buf, BufMut};

use crate::codec::{read_string, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::Uuid;
use crate::varint::VarInt;

/// LoginStart — Client → Server.
#[derive(Debug, Clone)]
pub struct LoginStart {
    pub username: String,
    pub uuid: Uuid,
}

impl ProtoEncode for LoginStart {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.username);
        self.uuid.proto_encode(buf);
    }
}

/// LoginAcknowledged — Client → Server. Empty body.
#[derive(Debug, Clone, Default)]
pub struct LoginAcknowledged;

impl ProtoEncode for LoginAcknowledged {
    fn proto_encode(&self, _buf: &mut impl BufMut) {}
}

/// LoginSuccess — Server → Client. Trailing property list is ignored.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub uuid: Uuid,
    pub username: String,
}

impl ProtoDecode for LoginSuccess {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let uuid = Uuid::proto_decode(buf)?;
        let username = read_string(buf)?;
        // Remainder (profile properties) is irrelevant to a headless client.
        Ok(Self { uuid, username })
    }
}

/// SetCompression — Server → Client.
#[derive(Debug, Clone, Copy)]
pub struct SetCompression {
    pub threshold: i32,
}

impl ProtoDecode for SetCompression {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            threshold: VarInt::proto_decode(buf)?.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn login_start_layout() {
        let pkt = LoginStart {
            username: "wanderer".into(),
            uuid: Uuid::offline("wanderer"),
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf[0], 8); // name length
        assert_eq!(&buf[1..9], b"wanderer");
        assert_eq!(buf.len(), 1 + 8 + 16);
    }

    #[test]
    fn login_success_ignores_trailer() {
        let mut buf = BytesMut::new();
        Uuid::new(1, 2).proto_encode(&mut buf);
        write_string(&mut buf, "steve");
        VarInt(0).proto_encode(&mut buf); // empty property list
        let decoded = LoginSuccess::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.uuid, Uuid::new(1, 2));
        assert_eq!(decoded.username, "steve");
    }

    #[test]
    fn set_compression_threshold() {
        let mut buf = BytesMut::new();
        VarInt(256).proto_encode(&mut buf);
        let decoded = SetCompression::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.threshold, 256);
    }

    #[test]
    fn truncated_login_success_fails() {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0u8; 10]); // not even a full UUID
        assert!(LoginSuccess::proto_decode(&mut buf.freeze()).is_err());
    }
}
