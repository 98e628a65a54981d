//! Configuration-state packets the client must answer.

use bytes::BufMut;

use crate::codec::{write_string, ProtoEncode};
use crate::types::Uuid;
use crate::varint::VarInt;

/// ClientInformation — Client → Server.
#[derive(Debug, Clone)]
pub struct ClientInformation {
    pub locale: String,
    pub view_distance: i8,
    pub chat_mode: i32,
    pub chat_colors: bool,
    pub skin_parts: u8,
    pub main_hand: i32,
    pub text_filtering: bool,
    pub server_listing: bool,
    pub particle_status: i32,
}

impl Default for ClientInformation {
    fn default() -> Self {
        Self {
            locale: "en_us".into(),
            view_distance: 8,
            chat_mode: 0,
            chat_colors: true,
            skin_parts: 0x7F,
            main_hand: 1,
            text_filtering: false,
            server_listing: true,
            particle_status: 0,
        }
    }
}

impl ProtoEncode for ClientInformation {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        write_string(buf, &self.locale);
        buf.put_i8(self.view_distance);
        VarInt(self.chat_mode).proto_encode(buf);
        buf.put_u8(self.chat_colors as u8);
        buf.put_u8(self.skin_parts);
        VarInt(self.main_hand).proto_encode(buf);
        buf.put_u8(self.text_filtering as u8);
        buf.put_u8(self.server_listing as u8);
        VarInt(self.particle_status).proto_encode(buf);
    }
}

/// AcknowledgeFinish — Client → Server. Empty body; completes the
/// configuration phase.
#[derive(Debug, Clone, Default)]
pub struct AcknowledgeFinish;

impl ProtoEncode for AcknowledgeFinish {
    fn proto_encode(&self, _buf: &mut impl BufMut) {}
}

/// KnownPacks — Client → Server. The client declares no known data packs.
#[derive(Debug, Clone, Default)]
pub struct KnownPacks;

impl ProtoEncode for KnownPacks {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(0).proto_encode(buf);
    }
}

/// ResourcePackResponse — Client → Server. Always reports success so the
/// server does not stall the configuration phase on pack delivery.
#[derive(Debug, Clone)]
pub struct ResourcePackResponse {
    pub pack_id: Uuid,
}

/// "Successfully downloaded" result code.
const RESOURCE_PACK_SUCCESS: i32 = 3;

impl ProtoEncode for ResourcePackResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        self.pack_id.proto_encode(buf);
        VarInt(RESOURCE_PACK_SUCCESS).proto_encode(buf);
    }
}

/// ConfigurationAcknowledged — Client → Server, sent from the play state
/// when the server starts a reconfiguration. Empty body.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationAcknowledged;

impl ProtoEncode for ConfigurationAcknowledged {
    fn proto_encode(&self, _buf: &mut impl BufMut) {}
}

/// CookieResponse — Client → Server. Empty refusal.
#[derive(Debug, Clone, Default)]
pub struct CookieResponse;

impl ProtoEncode for CookieResponse {
    fn proto_encode(&self, _buf: &mut impl BufMut) {}
}

/// PluginResponse — Client → Server. Empty refusal.
#[derive(Debug, Clone, Default)]
pub struct PluginResponse;

impl ProtoEncode for PluginResponse {
    fn proto_encode(&self, _buf: &mut impl BufMut) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn client_information_layout() {
        let pkt = ClientInformation::default();
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        // locale "en_us" (1 + 5), view dist, chat mode, colors, skin,
        // main hand, filtering, listing, particles.
        assert_eq!(buf.len(), 6 + 1 + 1 + 1 + 1 + 1 + 1 + 1 + 1);
        assert_eq!(&buf[1..6], b"en_us");
        assert_eq!(buf[6] as i8, 8);
        assert_eq!(buf[8], 1); // chat colors on
        assert_eq!(buf[9], 0x7F); // all skin parts
    }

    #[test]
    fn known_packs_declares_none() {
        let mut buf = BytesMut::new();
        KnownPacks.proto_encode(&mut buf);
        assert_eq!(&buf[..], &[0x00]);
    }

    #[test]
    fn resource_pack_response_reports_success() {
        let mut buf = BytesMut::new();
        ResourcePackResponse {
            pack_id: Uuid::new(7, 9),
        }
        .proto_encode(&mut buf);
        assert_eq!(buf.len(), 17);
        assert_eq!(buf[16], RESOURCE_PACK_SUCCESS as u8);
    }

    #[test]
    fn refusals_are_empty() {
        let mut buf = BytesMut::new();
        CookieResponse.proto_encode(&mut buf);
        PluginResponse.proto_encode(&mut buf);
        AcknowledgeFinish.proto_encode(&mut buf);
        assert!(buf.is_empty());
    }
}
