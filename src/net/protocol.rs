//! Wire protocol message definitions
//! These are the frame payload types for client-server communication

use serde::{Deserialize, Serialize};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Connection handshake, must be the first frame on a new socket
    Connect {
        /// Desired display name, unique among connected sessions
        name: String,
    },

    /// Currently held movement keys; applied every tick until replaced
    Move {
        left: bool,
        right: bool,
        up: bool,
        down: bool,
    },

    /// Fire one bullet from the ship's current position
    Shoot,

    /// `paused: true` requests a global pause, `false` confirms resume
    Pause { paused: bool },

    /// Vote to restart the match
    RestartVote,

    /// Liveness probe, answered with `heartbeat_ack`
    Heartbeat,

    /// Select a cosmetic ship model
    Personalize {
        /// Index into the client's model table
        model: u8,
    },

    /// Return a dead ship to the running game (score preserved)
    ReturnToGame,

    /// Orderly disconnect
    Disconnect,
}

impl ClientMsg {
    /// Whether `tag` names a known client message schema
    pub fn is_known_tag(tag: &str) -> bool {
        matches!(
            tag,
            "connect"
                | "move"
                | "shoot"
                | "pause"
                | "restart_vote"
                | "heartbeat"
                | "personalize"
                | "return_to_game"
                | "disconnect"
        )
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Handshake accepted; carries the server-assigned player id
    ConnectAck { player_id: u32 },

    /// Handshake rejected; the connection is closed right after
    ConnectError { reason: String },

    /// Full game state, broadcast once per tick
    Snapshot {
        ships: Vec<ShipDto>,
        bullets: Vec<BulletDto>,
        asteroids: Vec<AsteroidDto>,
        /// False once every existing ship is dead, until a restart
        active: bool,
    },

    /// A new player entered the arena
    PlayerJoined { player_id: u32, name: String },

    /// A player disconnected
    PlayerLeft { player_id: u32 },

    /// The game ended, or a restart completed (empty scores)
    GameOver {
        reason: String,
        final_scores: Vec<ShipDto>,
    },

    /// Cooperative pause status update
    PauseProgress {
        paused: bool,
        /// Players whose resume confirmation is still outstanding
        remaining: u32,
        /// Player whose request/confirmation triggered this update
        actor: u32,
    },

    /// Restart vote status update
    RestartProgress {
        current: u32,
        required: u32,
        actor: u32,
    },

    /// Reply to a client heartbeat
    HeartbeatAck,
}

/// Ship state for transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipDto {
    pub player_id: u32,
    pub x: f32,
    pub y: f32,
    /// Facing angle in radians, tracks the last movement direction
    pub heading: f32,
    pub alive: bool,
    pub score: i32,
    /// Size multiplier, grows with score
    pub size: f32,
    /// Cosmetic model index
    pub model: u8,
}

/// Bullet state for transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletDto {
    pub id: u32,
    pub owner: u32,
    pub x: f32,
    pub y: f32,
}

/// Asteroid state for transmission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidDto {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Cosmetic texture variant
    pub variant: u8,
}
