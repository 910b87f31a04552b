//! Concurrent collision detection
//!
//! The scan runs against read-only probe copies taken under the world lock,
//! so the data-parallel fan-out never observes a concurrent mutation. Each
//! (asteroid, bullet) test and each ship-overlap test is independent; the
//! winner-takes-one deduplication happens later, back under the lock.

use rayon::prelude::*;

/// Minimal ship view for the scan
#[derive(Debug, Clone, Copy)]
pub struct ShipProbe {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Minimal bullet view for the scan
#[derive(Debug, Clone, Copy)]
pub struct BulletProbe {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Minimal asteroid view for the scan
#[derive(Debug, Clone, Copy)]
pub struct AsteroidProbe {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Immutable entity copies for one tick's scan
#[derive(Debug, Default)]
pub struct ScanInput {
    /// Living ships only
    pub ships: Vec<ShipProbe>,
    pub bullets: Vec<BulletProbe>,
    pub asteroids: Vec<AsteroidProbe>,
}

/// Raw scan results, before deduplication
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Candidate (asteroid id, bullet id) hits, in deterministic order
    pub hits: Vec<(u32, u32)>,
    /// Ships overlapped by at least one asteroid
    pub dead_ships: Vec<u32>,
}

/// A bullet hits an asteroid when its center is inside the asteroid radius
fn bullet_hits(asteroid: &AsteroidProbe, bullet: &BulletProbe) -> bool {
    let dx = bullet.x - asteroid.x;
    let dy = bullet.y - asteroid.y;
    dx * dx + dy * dy < asteroid.radius * asteroid.radius
}

/// Ships collide on combined-radius overlap
fn ship_hits(asteroid: &AsteroidProbe, ship: &ShipProbe) -> bool {
    let dx = ship.x - asteroid.x;
    let dy = ship.y - asteroid.y;
    let reach = asteroid.radius + ship.radius;
    dx * dx + dy * dy < reach * reach
}

/// Run the O(asteroids × bullets) and O(ships × asteroids) scans in
/// parallel. Collection preserves input order, so downstream first-match
/// deduplication is deterministic.
pub fn scan(input: &ScanInput) -> ScanOutcome {
    let hits: Vec<(u32, u32)> = input
        .asteroids
        .par_iter()
        .flat_map_iter(|asteroid| {
            input
                .bullets
                .iter()
                .filter(move |bullet| bullet_hits(asteroid, bullet))
                .map(move |bullet| (asteroid.id, bullet.id))
        })
        .collect();

    let dead_ships: Vec<u32> = input
        .ships
        .par_iter()
        .filter(|ship| {
            input
                .asteroids
                .iter()
                .any(|asteroid| ship_hits(asteroid, ship))
        })
        .map(|ship| ship.id)
        .collect();

    ScanOutcome { hits, dead_ships }
}
