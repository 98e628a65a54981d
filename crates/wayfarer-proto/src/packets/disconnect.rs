//! Disconnect — Server → Client, any state.

use bytes::Buf;

use crate::codec::ProtoDecode;
use crate::error::ProtoError;
use crate::nbt;

/// The reason is a text-component tree; render it best-effort.
#[derive(Debug, Clone)]
pub struct Disconnect {
    pub reason: String,
}

impl ProtoDecode for Disconnect {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let data = buf.copy_to_bytes(buf.remaining());
        Ok(Self {
            reason: nbt::extract_text(&data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn reason_from_string_tag() {
        let mut buf = BytesMut::new();
        buf.put_u8(8);
        buf.put_u16(11);
        buf.put_slice(b"server full");
        let pkt = Disconnect::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(pkt.reason, "server full");
    }

    #[test]
    fn garbage_reason_still_yields_text() {
        let mut buf = BytesMut::new();
        buf.put_slice(&[0xFE, 0xFD, 0xFC]);
        // Lossy fallback; must not error.
        let pkt = Disconnect::proto_decode(&mut buf.freeze()).unwrap();
        assert!(!pkt.reason.is_empty());
    }
}
