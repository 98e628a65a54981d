//! JoinGame (play login) — Server → Client.

use bytes::Buf;

use crate::codec::{read_bool, read_i32, ProtoDecode};
use crate::error::ProtoError;

/// Carries the entity id the server assigned to this client. The long tail
/// of dimension/registry fields is irrelevant here and left unread.
#[derive(Debug, Clone, Copy)]
pub struct JoinGame {
    pub entity_id: i32,
    pub hardcore: bool,
}

impl ProtoDecode for JoinGame {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let entity_id = read_i32(buf)?;
        let hardcore = read_bool(buf)?;
        Ok(Self {
            entity_id,
            hardcore,
        })
    }
}
