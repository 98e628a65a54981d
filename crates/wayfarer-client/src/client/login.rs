use super::*;

use wayfarer_proto::packets::{
    CookieResponse, Disconnect, LoginAcknowledged, LoginSuccess, SetCompression,
};
use wayfarer_proto::ProtoDecode;

impl Client {
    pub(super) async fn handle_login_frame(
        &mut self,
        id: i32,
        mut body: Bytes,
    ) -> Result<(), ClientError> {
        match id {
            id::login::cb::SET_COMPRESSION => {
                match SetCompression::proto_decode(&mut body) {
                    Ok(pkt) => {
                        debug!(bot = %self.name, threshold = pkt.threshold, "compression enabled");
                        self.codec.enable_compression(pkt.threshold);
                    }
                    Err(e) => warn!(bot = %self.name, "bad set-compression: {e}"),
                }
            }
            id::login::cb::LOGIN_SUCCESS => {
                let pkt = match LoginSuccess::proto_decode(&mut body) {
                    Ok(pkt) => pkt,
                    Err(e) => {
                        warn!(bot = %self.name, "bad login-success: {e}");
                        return Ok(());
                    }
                };
                info!(bot = %self.name, username = %pkt.username, uuid = %pkt.uuid, "logged in");
                self.send_packet(id::login::sb::LOGIN_ACKNOWLEDGED, &LoginAcknowledged)
                    .await?;
                self.state = ConnectionState::Configuration;
                self.send_packet(id::configuration::sb::KNOWN_PACKS, &packets::KnownPacks)
                    .await?;
                self.emit(ClientEvent::Login {
                    bot: self.name.clone(),
                    uuid: pkt.uuid,
                })
                .await;
            }
            id::login::cb::COOKIE_REQUEST => {
                self.send_packet(id::login::sb::COOKIE_RESPONSE, &CookieResponse)
                    .await?;
            }
            id::login::cb::DISCONNECT => {
                let reason = Disconnect::proto_decode(&mut body)
                    .map(|d| d.reason)
                    .unwrap_or_else(|_| "unreadable disconnect".into());
                warn!(bot = %self.name, %reason, "disconnected during login");
                self.emit(ClientEvent::Disconnected {
                    bot: self.name.clone(),
                    reason,
                })
                .await;
                self.shutdown = true;
            }
            other => {
                debug!(bot = %self.name, id = format_args!("0x{other:02X}"), "unhandled login packet");
            }
        }
        Ok(())
    }
}
