//! Wire protocol: tagged packets serialized with bincode.
//!
//! Unrecognized or truncated payloads fail deserialization at the transport
//! boundary and are dropped there; simulation code only ever sees
//! well-formed packets.

use crate::movement::Controls;
use crate::world::{Vec2, WorldConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bumped on incompatible wire changes; mismatching clients are refused.
pub const PROTOCOL_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // client -> server
    Connect {
        client_version: u32,
        /// Opaque user identifier from the identity provider.
        user_id: String,
        /// Bearer token checked by the server's verifier.
        token: String,
    },
    Input {
        id: String,
        controls: Controls,
        ts: u64,
    },
    Disconnect,

    // server -> client
    Connected {
        session_id: u32,
    },
    World {
        config: WorldConfig,
    },
    Snapshot {
        players: HashMap<String, PlayerSnapshot>,
    },
    Disconnected {
        reason: String,
    },
}

/// Per-player entry of the full-state broadcast. `ts` is the timestamp of the
/// last input the server has applied for this player, which is what the
/// client uses to discard acknowledged history during reconciliation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub position: Vec2,
    pub rotation: f32,
    pub ts: u64,
}

impl PlayerSnapshot {
    pub fn at_origin() -> Self {
        PlayerSnapshot {
            position: Vec2::default(),
            rotation: 0.0,
            ts: 0,
        }
    }
}
