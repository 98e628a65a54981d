//! One headless client: connection, protocol state machine, and the wiring
//! between packets, the world model, and the motion controller.

mod configuration;
mod login;
mod play;

use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use wayfarer_nav::{Motion, MotionEvent, Pathfinder};
use wayfarer_proto::codec::ProtoEncode;
use wayfarer_proto::packets::{self, id, Handshake, LoginStart};
use wayfarer_proto::{FrameCodec, ProtoError, Uuid, Vec3};
use wayfarer_world::{BlockRegistry, EntityTracker, WorldCache};

use crate::config::{BotSection, ServerSection, SupervisorSection};

/// Motion tick period (20 Hz).
const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),

    #[error("server closed the connection")]
    ConnectionClosed,

    #[error("keep-alive silence exceeded {0:?}")]
    KeepAliveTimeout(Duration),
}

/// Events surfaced to the supervisor.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Login { bot: String, uuid: Uuid },
    Spawn { bot: String, entity_id: i32 },
    Position { bot: String, position: Vec3 },
    Health { bot: String, health: f32, food: i32 },
    Chat { bot: String, message: String },
    Arrived { bot: String },
    Disconnected { bot: String, reason: String },
    Error { bot: String, message: String },
}

/// Operator commands routed by the supervisor.
#[derive(Debug, Clone)]
pub enum Command {
    Goto { x: f64, y: f64, z: f64 },
    Stop,
    ReportPosition,
    Disconnect,
}

/// Protocol sub-state. Transitions are forward-only except the play →
/// configuration reversion the server may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Handshaking,
    Login,
    Configuration,
    Play,
}

pub struct Client {
    name: String,
    uuid: Uuid,
    protocol_version: i32,
    host: String,
    port: u16,

    state: ConnectionState,
    codec: FrameCodec,
    writer: OwnedWriteHalf,

    world: WorldCache,
    entities: EntityTracker,
    motion: Motion,

    events: mpsc::Sender<ClientEvent>,
    entity_id: i32,
    health: f32,
    last_inbound: Instant,
    keep_alive_window: Duration,
    shutdown: bool,
}

impl Client {
    /// Open the TCP connection and build the client. Returns the read half
    /// separately so `run` can own it.
    pub async fn connect(
        server: &ServerSection,
        supervisor: &SupervisorSection,
        bot: &BotSection,
        events: mpsc::Sender<ClientEvent>,
    ) -> Result<(Self, OwnedReadHalf), ClientError> {
        let stream = TcpStream::connect((server.host.as_str(), server.port)).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();

        let uuid = bot
            .uuid
            .as_deref()
            .and_then(Uuid::parse)
            .unwrap_or_else(|| Uuid::offline(&bot.username));

        // Echoing keep-alives is our only liveness duty; total silence far
        // past the expected cadence means the link is dead.
        let keep_alive_window =
            Duration::from_millis(supervisor.keep_alive_interval_ms.max(1000) * 4);

        let client = Self {
            name: bot.username.clone(),
            uuid,
            protocol_version: server.protocol_version,
            host: server.host.clone(),
            port: server.port,
            state: ConnectionState::Handshaking,
            codec: FrameCodec::new(),
            writer,
            world: WorldCache::new(BlockRegistry::vanilla()),
            entities: EntityTracker::new(),
            motion: Motion::new(Pathfinder::default()),
            events,
            entity_id: 0,
            health: 20.0,
            last_inbound: Instant::now(),
            keep_alive_window,
            shutdown: false,
        };
        Ok((client, reader))
    }

    /// Drive the connection until disconnect: socket reads, 50 ms motion
    /// ticks, and operator commands interleave on one cooperative loop.
    pub async fn run(
        mut self,
        mut reader: OwnedReadHalf,
        commands: &mut mpsc::Receiver<Command>,
    ) -> Result<(), ClientError> {
        let handshake = Handshake::login(self.protocol_version, &self.host, self.port);
        self.send_packet(id::handshaking::sb::HANDSHAKE, &handshake).await?;
        self.state = ConnectionState::Login;
        let login_start = LoginStart {
            username: self.name.clone(),
            uuid: self.uuid,
        };
        self.send_packet(id::login::sb::LOGIN_START, &login_start).await?;
        info!(bot = %self.name, uuid = %self.uuid, "login started");

        let mut tick = tokio::time::interval(TICK_INTERVAL);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut buf = vec![0u8; 16 * 1024];

        loop {
            tokio::select! {
                read = reader.read(&mut buf) => {
                    let n = read?;
                    if n == 0 {
                        self.emit(ClientEvent::Disconnected {
                            bot: self.name.clone(),
                            reason: "connection closed by server".into(),
                        }).await;
                        return Err(ClientError::ConnectionClosed);
                    }
                    self.last_inbound = Instant::now();
                    self.codec.feed(&buf[..n]);
                    while let Some((id, body)) = self.codec.next_frame()? {
                        self.handle_frame(id, body).await?;
                    }
                }
                _ = tick.tick() => {
                    self.on_tick().await?;
                }
                cmd = commands.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd).await?,
                        None => self.shutdown = true,
                    }
                }
            }
            if self.shutdown {
                return Ok(());
            }
        }
    }

    /// Packet dispatch, keyed by (state, id). Unknown ids are logged and
    /// dropped; handler decode failures are contained by the handlers.
    async fn handle_frame(&mut self, id: i32, body: Bytes) -> Result<(), ClientError> {
        match self.state {
            ConnectionState::Handshaking => {
                debug!(bot = %self.name, id, "packet before login start, ignored");
                Ok(())
            }
            ConnectionState::Login => self.handle_login_frame(id, body).await,
            ConnectionState::Configuration => self.handle_configuration_frame(id, body).await,
            ConnectionState::Play => self.handle_play_frame(id, body).await,
        }
    }

    async fn on_tick(&mut self) -> Result<(), ClientError> {
        if self.state != ConnectionState::Play {
            return Ok(());
        }
        if self.last_inbound.elapsed() > self.keep_alive_window {
            return Err(ClientError::KeepAliveTimeout(self.keep_alive_window));
        }

        let output = self.motion.tick(&self.world);
        if let Some(packet) = output.packet {
            self.send_packet(id::play::sb::SET_PLAYER_POSITION_ROTATION, &packet)
                .await?;
        }
        for event in output.events {
            match event {
                MotionEvent::Arrived => {
                    info!(bot = %self.name, at = %self.motion.position(), "arrived");
                    self.emit(ClientEvent::Arrived {
                        bot: self.name.clone(),
                    })
                    .await;
                }
                MotionEvent::PathFailed => {
                    self.emit(ClientEvent::Error {
                        bot: self.name.clone(),
                        message: "no path to target".into(),
                    })
                    .await;
                }
            }
        }
        Ok(())
    }

    async fn handle_command(&mut self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::Goto { x, y, z } => {
                info!(bot = %self.name, x, y, z, "goto");
                self.motion.goto(Vec3::new(x, y, z));
            }
            Command::Stop => {
                info!(bot = %self.name, "stop");
                self.motion.stop();
            }
            Command::ReportPosition => {
                let position = self.motion.position();
                info!(
                    bot = %self.name,
                    entity_id = self.entity_id,
                    health = self.health,
                    %position,
                    "position report"
                );
                self.emit(ClientEvent::Position {
                    bot: self.name.clone(),
                    position,
                })
                .await;
            }
            Command::Disconnect => {
                info!(bot = %self.name, "disconnect requested");
                self.shutdown = true;
            }
        }
        Ok(())
    }

    async fn send_packet(
        &mut self,
        id: i32,
        packet: &impl ProtoEncode,
    ) -> Result<(), ClientError> {
        let mut body = BytesMut::new();
        packet.proto_encode(&mut body);
        let frame = self.codec.encode(id, &body)?;
        self.writer.write_all(&frame).await?;
        Ok(())
    }

    async fn emit(&self, event: ClientEvent) {
        if self.events.send(event).await.is_err() {
            warn!(bot = %self.name, "event channel closed");
        }
    }

    /// Dimension switches and reconfigurations invalidate everything the
    /// client has mirrored.
    fn reset_world(&mut self) {
        self.world = WorldCache::new(BlockRegistry::vanilla());
        self.entities.clear();
        self.motion.stop();
    }
}
