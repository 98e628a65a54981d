use super::*;

use wayfarer_proto::packets::{
    AcknowledgeFinish, ClientInformation, CookieResponse, Disconnect, KeepAlive, Ping, Pong,
    ResourcePackResponse,
};
use wayfarer_proto::ProtoDecode;

impl Client {
    pub(super) async fn handle_configuration_frame(
        &mut self,
        id: i32,
        mut body: Bytes,
    ) -> Result<(), ClientError> {
        match id {
            id::configuration::cb::FINISH_CONFIGURATION => {
                self.send_packet(
                    id::configuration::sb::CLIENT_INFORMATION,
                    &ClientInformation::default(),
                )
                .await?;
                self.send_packet(id::configuration::sb::ACKNOWLEDGE_FINISH, &AcknowledgeFinish)
                    .await?;
                self.state = ConnectionState::Play;
                info!(bot = %self.name, "configuration finished, entering play");
            }
            id::configuration::cb::KEEP_ALIVE => match KeepAlive::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.send_packet(id::configuration::sb::KEEP_ALIVE, &pkt).await?;
                }
                Err(e) => warn!(bot = %self.name, "bad keep-alive: {e}"),
            },
            id::configuration::cb::PING => match Ping::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.send_packet(id::configuration::sb::PONG, &Pong { id: pkt.id })
                        .await?;
                }
                Err(e) => warn!(bot = %self.name, "bad ping: {e}"),
            },
            id::configuration::cb::COOKIE_REQUEST => {
                self.send_packet(id::configuration::sb::COOKIE_RESPONSE, &CookieResponse)
                    .await?;
            }
            id::configuration::cb::ADD_RESOURCE_PACK => {
                // Claim success so the server does not stall the phase.
                match Uuid::proto_decode(&mut body) {
                    Ok(pack_id) => {
                        self.send_packet(
                            id::configuration::sb::RESOURCE_PACK_RESPONSE,
                            &ResourcePackResponse { pack_id },
                        )
                        .await?;
                    }
                    Err(e) => warn!(bot = %self.name, "bad resource-pack offer: {e}"),
                }
            }
            id::configuration::cb::DISCONNECT => {
                let reason = Disconnect::proto_decode(&mut body)
                    .map(|d| d.reason)
                    .unwrap_or_else(|_| "unreadable disconnect".into());
                warn!(bot = %self.name, %reason, "disconnected during configuration");
                self.emit(ClientEvent::Disconnected {
                    bot: self.name.clone(),
                    reason,
                })
                .await;
                self.shutdown = true;
            }
            other => {
                debug!(
                    bot = %self.name,
                    id = format_args!("0x{other:02X}"),
                    "unhandled configuration packet"
                );
            }
        }
        Ok(())
    }
}
