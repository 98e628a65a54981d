//! Keep-alive and ping/pong echoes. The client's only obligation is to send
//! the payload back in the matching serverbound packet, in the state it
//! arrived in.

use bytes::{Buf, BufMut};

use crate::codec::{read_i32, read_i64, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// KeepAlive — both directions; the serverbound copy echoes the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    pub id: i64,
}

impl ProtoDecode for KeepAlive {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            id: read_i64(buf)?,
        })
    }
}

impl ProtoEncode for KeepAlive {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i64(self.id);
    }
}

/// Ping — Server → Client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ping {
    pub id: i32,
}

impl ProtoDecode for Ping {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            id: read_i32(buf)?,
        })
    }
}

/// Pong — Client → Server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pong {
    pub id: i32,
}

impl ProtoEncode for Pong {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_i32(self.id);
    }
}
