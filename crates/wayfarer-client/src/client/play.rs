use super::*;

use wayfarer_proto::packets::{
    BlockUpdate, ChunkBatchReceived, ChunkData, ClientStatus, ConfigurationAcknowledged,
    ConfirmTeleport, Disconnect, JoinGame, KeepAlive, Ping, Pong, RemoveEntities, SetHealth,
    SpawnEntity, SynchronizePosition, SystemChat, TeleportEntity, UnloadChunk,
    UpdateEntityPosition, UpdateEntityPositionRotation,
};
use wayfarer_proto::ProtoDecode;

impl Client {
    pub(super) async fn handle_play_frame(
        &mut self,
        id: i32,
        mut body: Bytes,
    ) -> Result<(), ClientError> {
        match id {
            id::play::cb::KEEP_ALIVE => match KeepAlive::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.send_packet(id::play::sb::KEEP_ALIVE, &pkt).await?;
                }
                Err(e) => warn!(bot = %self.name, "bad keep-alive: {e}"),
            },
            id::play::cb::PING => match Ping::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.send_packet(id::play::sb::PONG, &Pong { id: pkt.id }).await?;
                }
                Err(e) => warn!(bot = %self.name, "bad ping: {e}"),
            },
            id::play::cb::JOIN_GAME => match JoinGame::proto_decode(&mut body) {
                Ok(pkt) => {
                    info!(bot = %self.name, entity_id = pkt.entity_id, "joined the world");
                    self.entity_id = pkt.entity_id;
                    self.emit(ClientEvent::Spawn {
                        bot: self.name.clone(),
                        entity_id: pkt.entity_id,
                    })
                    .await;
                }
                Err(e) => warn!(bot = %self.name, "bad join packet: {e}"),
            },
            id::play::cb::SYNCHRONIZE_POSITION => {
                match SynchronizePosition::proto_decode(&mut body) {
                    Ok(pkt) => {
                        debug!(bot = %self.name, at = %pkt.position, "server position sync");
                        self.send_packet(
                            id::play::sb::CONFIRM_TELEPORT,
                            &ConfirmTeleport {
                                teleport_id: pkt.teleport_id,
                            },
                        )
                        .await?;
                        self.motion.server_position_reset(
                            pkt.position,
                            pkt.yaw as f64,
                            pkt.pitch as f64,
                        );
                        self.emit(ClientEvent::Position {
                            bot: self.name.clone(),
                            position: pkt.position,
                        })
                        .await;
                    }
                    Err(e) => warn!(bot = %self.name, "bad position sync: {e}"),
                }
            }
            id::play::cb::CHUNK_DATA => match ChunkData::proto_decode(&mut body) {
                Ok(pkt) => {
                    // Failures are already counted by the cache; the server
                    // keeps sending regardless.
                    let _ = self.world.store_chunk(pkt.pos, &pkt.body);
                }
                Err(e) => warn!(bot = %self.name, "bad chunk packet: {e}"),
            },
            id::play::cb::UNLOAD_CHUNK => match UnloadChunk::proto_decode(&mut body) {
                Ok(pkt) => self.world.unload_chunk(pkt.pos),
                Err(e) => warn!(bot = %self.name, "bad unload packet: {e}"),
            },
            id::play::cb::CHUNK_BATCH_FINISHED => {
                self.send_packet(
                    id::play::sb::CHUNK_BATCH_RECEIVED,
                    &ChunkBatchReceived::default(),
                )
                .await?;
            }
            id::play::cb::CHUNK_BATCH_START => {}
            id::play::cb::BLOCK_UPDATE => match BlockUpdate::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.world
                        .put_block(pkt.pos.x, pkt.pos.y, pkt.pos.z, pkt.state.max(0) as u32);
                }
                Err(e) => warn!(bot = %self.name, "bad block update: {e}"),
            },
            id::play::cb::SPAWN_ENTITY => match SpawnEntity::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.entities.add(pkt.entity_id, pkt.entity_type, pkt.position);
                }
                Err(e) => warn!(bot = %self.name, "bad spawn-entity: {e}"),
            },
            id::play::cb::UPDATE_ENTITY_POSITION => {
                match UpdateEntityPosition::proto_decode(&mut body) {
                    Ok(pkt) => self.entities.apply_delta(pkt.entity_id, pkt.delta),
                    Err(e) => warn!(bot = %self.name, "bad entity move: {e}"),
                }
            }
            id::play::cb::UPDATE_ENTITY_POSITION_ROTATION => {
                match UpdateEntityPositionRotation::proto_decode(&mut body) {
                    Ok(pkt) => self.entities.apply_delta(pkt.entity_id, pkt.delta),
                    Err(e) => warn!(bot = %self.name, "bad entity move: {e}"),
                }
            }
            id::play::cb::TELEPORT_ENTITY => match TeleportEntity::proto_decode(&mut body) {
                Ok(pkt) => self.entities.set_position(pkt.entity_id, pkt.position),
                Err(e) => warn!(bot = %self.name, "bad entity teleport: {e}"),
            },
            id::play::cb::REMOVE_ENTITIES => match RemoveEntities::proto_decode(&mut body) {
                Ok(pkt) => {
                    for entity_id in pkt.entity_ids {
                        self.entities.remove(entity_id);
                    }
                }
                Err(e) => warn!(bot = %self.name, "bad remove-entities: {e}"),
            },
            id::play::cb::SET_HEALTH => match SetHealth::proto_decode(&mut body) {
                Ok(pkt) => {
                    self.health = pkt.health;
                    self.emit(ClientEvent::Health {
                        bot: self.name.clone(),
                        health: pkt.health,
                        food: pkt.food,
                    })
                    .await;
                    if pkt.health <= 0.0 {
                        info!(bot = %self.name, "died, requesting respawn");
                        self.motion.stop();
                        self.send_packet(id::play::sb::CLIENT_STATUS, &ClientStatus::respawn())
                            .await?;
                    }
                }
                Err(e) => warn!(bot = %self.name, "bad set-health: {e}"),
            },
            id::play::cb::SYSTEM_CHAT => match SystemChat::proto_decode(&mut body) {
                Ok(pkt) if !pkt.overlay => {
                    self.emit(ClientEvent::Chat {
                        bot: self.name.clone(),
                        message: pkt.content,
                    })
                    .await;
                }
                Ok(_) => {}
                Err(e) => debug!(bot = %self.name, "unreadable system chat: {e}"),
            },
            id::play::cb::START_CONFIGURATION => {
                info!(bot = %self.name, "server restarted configuration");
                self.send_packet(
                    id::play::sb::CONFIGURATION_ACKNOWLEDGED,
                    &ConfigurationAcknowledged,
                )
                .await?;
                self.reset_world();
                self.state = ConnectionState::Configuration;
            }
            id::play::cb::DISCONNECT => {
                let reason = Disconnect::proto_decode(&mut body)
                    .map(|d| d.reason)
                    .unwrap_or_else(|_| "unreadable disconnect".into());
                warn!(bot = %self.name, %reason, "disconnected");
                self.emit(ClientEvent::Disconnected {
                    bot: self.name.clone(),
                    reason,
                })
                .await;
                self.shutdown = true;
            }
            other => {
                debug!(bot = %self.name, id = format_args!("0x{other:02X}"), "unhandled play packet");
            }
        }
        Ok(())
    }
}
