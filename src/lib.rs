//! Asteroids Arena Server - authoritative multiplayer game server
//!
//! Simulates a shared arena of ships, bullets and asteroids, accepts
//! commands from concurrently connected clients over length-prefixed JSON
//! TCP frames, and broadcasts consistent state snapshots at a fixed
//! cadence. Pausing and restarting are multi-party protocols: every player
//! present at pause time must confirm a resume, and restarting a
//! multiplayer game requires a unanimous vote.

pub mod app;
pub mod config;
pub mod game;
pub mod net;
pub mod util;
