//! Authoritative world state and lifecycle
//!
//! One `World` lives behind the app's coarse lock. The tick loop drives it
//! in two locked phases (`integrate` then `apply`/`run_spawner`/
//! `check_ended`) with the parallel collision scan running lock-free in
//! between on the probe copies `integrate` hands out.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use super::collision::{AsteroidProbe, BulletProbe, ScanInput, ScanOutcome, ShipProbe};
use super::entities::{Asteroid, Bullet, MoveInput, Ship};
use super::pause::PauseCoordinator;
use super::restart::{RestartCoordinator, VoteOutcome};
use super::{physics, spawn};

pub struct World {
    pub(crate) ships: HashMap<u32, Ship>,
    pub(crate) bullets: HashMap<u32, Bullet>,
    pub(crate) asteroids: HashMap<u32, Asteroid>,
    pub pause: PauseCoordinator,
    pub votes: RestartCoordinator,
    /// Monotonic while alive; reset only by a full restart
    next_bullet_id: u32,
    next_asteroid_id: u32,
    /// Simulation seconds since the last full restart; drives difficulty
    clock: f32,
    last_spawn: f32,
    /// Latched false once every existing ship is dead, until a restart
    active: bool,
    rng: ChaCha8Rng,
}

impl World {
    pub fn new() -> Self {
        Self::with_seed(rand::thread_rng().gen())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            ships: HashMap::new(),
            bullets: HashMap::new(),
            asteroids: HashMap::new(),
            pause: PauseCoordinator::default(),
            votes: RestartCoordinator::default(),
            next_bullet_id: 1,
            next_asteroid_id: 1,
            clock: 0.0,
            last_spawn: 0.0,
            active: true,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn ship(&self, id: u32) -> Option<&Ship> {
        self.ships.get(&id)
    }

    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    pub fn asteroid_count(&self) -> usize {
        self.asteroids.len()
    }

    /// Create the ship for a newly connected player. If a ship already
    /// exists for the id (reconnect), it is reactivated in place instead,
    /// keeping its score.
    pub fn spawn_ship(&mut self, id: u32) {
        match self.ships.entry(id) {
            Entry::Occupied(mut entry) => entry.get_mut().reactivate(),
            Entry::Vacant(entry) => {
                entry.insert(Ship::new(id));
                info!(player_id = id, "ship spawned at arena center");
            }
        }
    }

    /// Return-to-game path: position and alive flag reset, score preserved
    pub fn reactivate_ship(&mut self, id: u32) {
        self.ships
            .entry(id)
            .and_modify(|ship| ship.reactivate())
            .or_insert_with(|| Ship::new(id));
        debug!(player_id = id, "ship reactivated");
    }

    /// Remove a departing player's ship and bullets
    pub fn remove_ship(&mut self, id: u32) {
        if self.ships.remove(&id).is_some() {
            debug!(player_id = id, "ship removed");
        }
        self.bullets.retain(|_, bullet| bullet.owner != id);
    }

    pub fn set_input(&mut self, id: u32, input: MoveInput) {
        if let Some(ship) = self.ships.get_mut(&id) {
            ship.input = input;
        }
    }

    pub fn set_model(&mut self, id: u32, model: u8) {
        if let Some(ship) = self.ships.get_mut(&id) {
            ship.model = model;
        }
    }

    /// Fire a bullet from a living ship
    pub fn fire_bullet(&mut self, id: u32) {
        if let Some(ship) = self.ships.get(&id).filter(|s| s.alive) {
            let bullet = ship.fire(self.next_bullet_id);
            self.next_bullet_id += 1;
            self.bullets.insert(bullet.id, bullet);
        }
    }

    /// Register a restart vote; executes the restart when the outcome says so
    pub fn vote_restart(&mut self, actor: u32, connected: &HashSet<u32>) -> VoteOutcome {
        let outcome = self.votes.vote(actor, connected);
        if outcome == VoteOutcome::Restart {
            self.restart();
        }
        outcome
    }

    /// Full restart: entities cleared, clock and id counters rewound,
    /// every ship reinstated at the center with a zeroed score.
    pub fn restart(&mut self) {
        self.bullets.clear();
        self.asteroids.clear();
        self.next_bullet_id = 1;
        self.next_asteroid_id = 1;
        self.clock = 0.0;
        self.last_spawn = 0.0;
        self.active = true;
        self.votes.clear();

        for ship in self.ships.values_mut() {
            ship.reset();
        }

        info!("game restarted");
    }

    /// Tick phase 1, under the lock: advance all motion by `dt`, cull
    /// entities that left the arena and copy out scan probes. Returns
    /// `None` when the simulation is frozen (paused or ended), in which
    /// case nothing moved and there is nothing to scan.
    pub fn integrate(&mut self, dt: f32) -> Option<ScanInput> {
        if !self.active || self.pause.is_paused() {
            return None;
        }

        self.clock += dt;

        for ship in self.ships.values_mut() {
            physics::step_ship(ship, dt);
        }

        for bullet in self.bullets.values_mut() {
            bullet.advance(dt);
        }
        self.bullets.retain(|_, bullet| !bullet.is_off_arena());

        for asteroid in self.asteroids.values_mut() {
            asteroid.advance(dt);
        }
        self.asteroids.retain(|_, asteroid| !asteroid.is_off_arena());

        Some(ScanInput {
            ships: self
                .ships
                .values()
                .filter(|s| s.alive)
                .map(|s| ShipProbe {
                    id: s.id,
                    x: s.x,
                    y: s.y,
                    radius: s.radius(),
                })
                .collect(),
            bullets: self
                .bullets
                .values()
                .map(|b| BulletProbe {
                    id: b.id,
                    x: b.x,
                    y: b.y,
                })
                .collect(),
            asteroids: self
                .asteroids
                .values()
                .map(|a| AsteroidProbe {
                    id: a.id,
                    x: a.x,
                    y: a.y,
                    radius: a.radius,
                })
                .collect(),
        })
    }

    /// Tick phase 2, back under the lock: resolve scan candidates.
    /// First match wins; later candidates touching an already-claimed
    /// asteroid or bullet are discarded. Ship deaths do not consume the
    /// asteroid.
    pub fn apply(&mut self, outcome: ScanOutcome) {
        let mut claimed_asteroids = HashSet::new();
        let mut claimed_bullets = HashSet::new();

        for (asteroid_id, bullet_id) in outcome.hits {
            if claimed_asteroids.contains(&asteroid_id) || claimed_bullets.contains(&bullet_id) {
                continue;
            }
            // A disconnect between scan and apply may have removed either
            if !self.asteroids.contains_key(&asteroid_id)
                || !self.bullets.contains_key(&bullet_id)
            {
                continue;
            }

            claimed_asteroids.insert(asteroid_id);
            claimed_bullets.insert(bullet_id);
            self.asteroids.remove(&asteroid_id);

            if let Some(bullet) = self.bullets.remove(&bullet_id) {
                if let Some(ship) = self.ships.get_mut(&bullet.owner) {
                    ship.add_points(physics::POINTS_PER_ASTEROID);
                }
            }
        }

        for id in outcome.dead_ships {
            if let Some(ship) = self.ships.get_mut(&id) {
                if ship.alive {
                    ship.alive = false;
                    info!(player_id = id, "ship destroyed by asteroid");
                }
            }
        }
    }

    /// Spawn a burst of asteroids when the difficulty schedule says so
    pub fn run_spawner(&mut self) {
        if self.clock - self.last_spawn < spawn::spawn_interval(self.clock) {
            return;
        }

        for _ in 0..spawn::burst_count(self.clock) {
            let asteroid = spawn::roll_asteroid(&mut self.rng, self.next_asteroid_id, self.clock);
            self.next_asteroid_id += 1;
            self.asteroids.insert(asteroid.id, asteroid);
        }
        self.last_spawn = self.clock;
    }

    /// Latch the ended state: at least one ship exists and all are dead.
    /// Only `restart` re-arms the game.
    pub fn check_ended(&mut self) {
        if self.active && !self.ships.is_empty() && self.ships.values().all(|s| !s.alive) {
            self.active = false;
            info!("game over, all ships destroyed");
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
