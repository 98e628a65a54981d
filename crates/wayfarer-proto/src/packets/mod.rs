//! Packet definitions for the supported protocol.
//!
//! Serverbound packets implement [`ProtoEncode`](crate::codec::ProtoEncode);
//! clientbound packets implement [`ProtoDecode`](crate::codec::ProtoDecode).
//! Ids live in [`id`], keyed by connection state and direction.

pub mod block_update;
pub mod chat;
pub mod chunk_batch;
pub mod chunk_data;
pub mod configuration;
pub mod disconnect;
pub mod entity;
pub mod handshake;
pub mod health;
pub mod join_game;
pub mod keep_alive;
pub mod login;
pub mod position;
pub mod sync_position;

pub use block_update::BlockUpdate;
pub use chat::{ChatMessage, SystemChat};
pub use chunk_batch::ChunkBatchReceived;
pub use chunk_data::{ChunkData, UnloadChunk};
pub use configuration::{
    AcknowledgeFinish, ClientInformation, ConfigurationAcknowledged, CookieResponse, KnownPacks,
    PluginResponse, ResourcePackResponse,
};
pub use disconnect::Disconnect;
pub use entity::{
    RemoveEntities, SpawnEntity, TeleportEntity, UpdateEntityPosition,
    UpdateEntityPositionRotation,
};
pub use handshake::Handshake;
pub use health::{ClientStatus, SetHealth};
pub use join_game::JoinGame;
pub use keep_alive::{KeepAlive, Ping, Pong};
pub use login::{LoginAcknowledged, LoginStart, LoginSuccess, SetCompression};
pub use position::SetPlayerPositionRotation;
pub use sync_position::{ConfirmTeleport, SynchronizePosition};

/// Packet ids for the single supported protocol number (769).
pub mod id {
    pub mod handshaking {
        pub mod sb {
            pub const HANDSHAKE: i32 = 0x00;
        }
    }

    pub mod login {
        pub mod cb {
            pub const DISCONNECT: i32 = 0x00;
            pub const LOGIN_SUCCESS: i32 = 0x02;
            pub const SET_COMPRESSION: i32 = 0x03;
            pub const COOKIE_REQUEST: i32 = 0x05;
        }
        pub mod sb {
            pub const LOGIN_START: i32 = 0x00;
            pub const LOGIN_ACKNOWLEDGED: i32 = 0x03;
            pub const COOKIE_RESPONSE: i32 = 0x04;
        }
    }

    pub mod configuration {
        pub mod cb {
            pub const COOKIE_REQUEST: i32 = 0x00;
            pub const DISCONNECT: i32 = 0x02;
            pub const FINISH_CONFIGURATION: i32 = 0x03;
            pub const KEEP_ALIVE: i32 = 0x04;
            pub const PING: i32 = 0x05;
            pub const ADD_RESOURCE_PACK: i32 = 0x09;
        }
        pub mod sb {
            pub const CLIENT_INFORMATION: i32 = 0x00;
            pub const COOKIE_RESPONSE: i32 = 0x01;
            pub const PLUGIN_RESPONSE: i32 = 0x02;
            pub const ACKNOWLEDGE_FINISH: i32 = 0x03;
            pub const KEEP_ALIVE: i32 = 0x04;
            pub const PONG: i32 = 0x05;
            pub const RESOURCE_PACK_RESPONSE: i32 = 0x06;
            pub const KNOWN_PACKS: i32 = 0x07;
        }
    }

    pub mod play {
        pub mod cb {
            pub const SPAWN_ENTITY: i32 = 0x01;
            pub const BLOCK_UPDATE: i32 = 0x09;
            pub const CHUNK_BATCH_FINISHED: i32 = 0x0C;
            pub const CHUNK_BATCH_START: i32 = 0x0D;
            pub const DISCONNECT: i32 = 0x1D;
            pub const TELEPORT_ENTITY: i32 = 0x20;
            pub const UNLOAD_CHUNK: i32 = 0x22;
            pub const KEEP_ALIVE: i32 = 0x27;
            pub const CHUNK_DATA: i32 = 0x28;
            pub const JOIN_GAME: i32 = 0x2C;
            pub const UPDATE_ENTITY_POSITION: i32 = 0x2F;
            pub const UPDATE_ENTITY_POSITION_ROTATION: i32 = 0x30;
            pub const PING: i32 = 0x37;
            pub const SYNCHRONIZE_POSITION: i32 = 0x42;
            pub const REMOVE_ENTITIES: i32 = 0x47;
            pub const SET_HEALTH: i32 = 0x62;
            pub const START_CONFIGURATION: i32 = 0x70;
            pub const SYSTEM_CHAT: i32 = 0x73;
        }
        pub mod sb {
            pub const CONFIRM_TELEPORT: i32 = 0x00;
            pub const CHAT_MESSAGE: i32 = 0x08;
            pub const CHUNK_BATCH_RECEIVED: i32 = 0x0A;
            pub const CLIENT_STATUS: i32 = 0x0B;
            pub const KEEP_ALIVE: i32 = 0x1B;
            pub const SET_PLAYER_POSITION_ROTATION: i32 = 0x1E;
            pub const PONG: i32 = 0x2C;
            pub const CONFIGURATION_ACKNOWLEDGED: i32 = 0x0E;
        }
    }
}
