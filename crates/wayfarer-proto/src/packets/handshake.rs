//! Handshake (0x00) — Client → Server.
//!
//! First packet on the wire; `next_state` selects the follow-up
//! sub-protocol (2 = login).

use bytes::BufMut;

use crate::codec::{write_string, ProtoEncode};
use crate::varint::VarInt;

/// Requested next connection state.
pub const NEXT_STATE_LOGIN: i32 = 2;

#[derive(Debug, Clone)]
pub struct Handshake {
    pub protocol_version: i32,
    pub host: String,
    pub port: u16,
    pub next_state: i32,
}

impl Handshake {
    pub fn login(protocol_version: i32, host: &str, port: u16) -> Self {
        Self {
            protocol_version,
            host: host.to_string(),
            port,
            next_state: NEXT_STATE_LOGIN,
        }
    }
}

impl ProtoEncode for Handshake {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.protocol_version).proto_encode(buf);
        write_string(buf, &self.host);
        buf.put_u16(self.port);
        VarInt(self.next_state).proto_encode(buf);
    }
}
