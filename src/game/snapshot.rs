//! Per-tick snapshot assembly
//!
//! Built under the world lock, then broadcast without it. Lists are sorted
//! by id so consecutive snapshots are stable for clients and tests.

use crate::net::protocol::{AsteroidDto, BulletDto, ServerMsg, ShipDto};

use super::world::World;

/// Ship DTOs, also used as the final scores of a game-over broadcast
pub fn ship_dtos(world: &World) -> Vec<ShipDto> {
    let mut ships: Vec<ShipDto> = world
        .ships
        .values()
        .map(|s| ShipDto {
            player_id: s.id,
            x: s.x,
            y: s.y,
            heading: s.heading,
            alive: s.alive,
            score: s.score,
            size: s.size,
            model: s.model,
        })
        .collect();
    ships.sort_by_key(|s| s.player_id);
    ships
}

/// Assemble the immutable snapshot message for one tick
pub fn build(world: &World) -> ServerMsg {
    let mut bullets: Vec<BulletDto> = world
        .bullets
        .values()
        .map(|b| BulletDto {
            id: b.id,
            owner: b.owner,
            x: b.x,
            y: b.y,
        })
        .collect();
    bullets.sort_by_key(|b| b.id);

    let mut asteroids: Vec<AsteroidDto> = world
        .asteroids
        .values()
        .map(|a| AsteroidDto {
            id: a.id,
            x: a.x,
            y: a.y,
            radius: a.radius,
            variant: a.variant,
        })
        .collect();
    asteroids.sort_by_key(|a| a.id);

    ServerMsg::Snapshot {
        ships: ship_dtos(world),
        bullets,
        asteroids,
        active: world.is_active(),
    }
}
