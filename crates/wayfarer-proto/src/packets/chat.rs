//! Chat: outgoing unsigned messages and incoming system chat.

use bytes::{Buf, BufMut};

use crate::codec::{read_bool, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::nbt;
use crate::varint::VarInt;

/// ChatMessage — Client → Server. Always unsigned: the signature flag is
/// false and both acknowledgement fields are zero.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub message: String,
    pub timestamp: i64,
    pub salt: i64,
}

impl ProtoEncode for ChatMessage {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.message);
        buf.put_i64(self.timestamp);
        buf.put_i64(self.salt);
        buf.put_u8(0); // no signature
        VarInt(0).proto_encode(buf);
        VarInt(0).proto_encode(buf);
    }
}

/// SystemChat — Server → Client. The content is a text-component tree; the
/// headless client only wants its plain text.
#[derive(Debug, Clone)]
pub struct SystemChat {
    pub content: String,
    pub overlay: bool,
}

impl ProtoDecode for SystemChat {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let data = buf.copy_to_bytes(buf.remaining());
        let tree_len = nbt::skip_nameless_root(&data)?;
        let content = nbt::extract_text(&data[..tree_len]);
        let mut rest = &data[tree_len..];
        let overlay = read_bool(&mut rest)?;
        Ok(Self { content, overlay })
    }
}
