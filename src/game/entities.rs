//! Arena entities: ships, bullets, asteroids

use super::physics::{self, ARENA_HEIGHT, ARENA_WIDTH, SHIP_BASE_RADIUS};

/// Movement keys currently held by a player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// A player ship (authoritative)
#[derive(Debug, Clone)]
pub struct Ship {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// Facing angle in radians, follows the last movement direction
    pub heading: f32,
    pub alive: bool,
    pub score: i32,
    /// Size multiplier, stepped up as score crosses growth thresholds
    pub size: f32,
    /// Cosmetic model index chosen by the player
    pub model: u8,
    /// Held keys applied on every tick
    pub input: MoveInput,
}

impl Ship {
    /// New ship at the arena center
    pub fn new(id: u32) -> Self {
        Self {
            id,
            x: ARENA_WIDTH / 2.0,
            y: ARENA_HEIGHT / 2.0,
            heading: 0.0,
            alive: true,
            score: 0,
            size: 1.0,
            model: 0,
            input: MoveInput::default(),
        }
    }

    /// Collision radius, base radius scaled by the size multiplier
    pub fn radius(&self) -> f32 {
        SHIP_BASE_RADIUS * self.size
    }

    /// Award points, growing the ship each time a threshold level is crossed.
    /// Size never shrinks.
    pub fn add_points(&mut self, points: i32) {
        let previous_level = self.score / physics::GROWTH_THRESHOLD;
        self.score += points;
        let level = self.score / physics::GROWTH_THRESHOLD;

        if level > previous_level {
            self.size = 1.0 + level as f32 * physics::GROWTH_INCREMENT;
        }
    }

    /// Spawn a bullet just above the ship's nose
    pub fn fire(&self, bullet_id: u32) -> Bullet {
        Bullet {
            id: bullet_id,
            owner: self.id,
            x: self.x,
            y: self.y - physics::BULLET_MUZZLE_OFFSET,
            vel_x: 0.0,
            vel_y: -physics::BULLET_SPEED,
        }
    }

    /// Full-restart reset: back to center, score and size wiped
    pub fn reset(&mut self) {
        self.x = ARENA_WIDTH / 2.0;
        self.y = ARENA_HEIGHT / 2.0;
        self.heading = 0.0;
        self.alive = true;
        self.score = 0;
        self.size = 1.0;
        self.input = MoveInput::default();
    }

    /// Return-to-game reactivation: position and alive flag only,
    /// score and size carry over
    pub fn reactivate(&mut self) {
        self.x = ARENA_WIDTH / 2.0;
        self.y = ARENA_HEIGHT / 2.0;
        self.alive = true;
        self.input = MoveInput::default();
    }
}

/// A bullet in flight
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: u32,
    pub owner: u32,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
}

impl Bullet {
    pub fn advance(&mut self, dt: f32) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
    }

    /// Bullets travel upward and are culled just past the top edge
    pub fn is_off_arena(&self) -> bool {
        self.y < physics::BULLET_CULL_Y
    }
}

/// An asteroid falling through the arena
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub radius: f32,
    /// Cosmetic texture variant
    pub variant: u8,
}

impl Asteroid {
    pub fn advance(&mut self, dt: f32) {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
    }

    pub fn is_off_arena(&self) -> bool {
        self.y > ARENA_HEIGHT + self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ship_spawns_centered() {
        let ship = Ship::new(1);
        assert_eq!(ship.x, ARENA_WIDTH / 2.0);
        assert_eq!(ship.y, ARENA_HEIGHT / 2.0);
        assert!(ship.alive);
        assert_eq!(ship.score, 0);
        assert_eq!(ship.size, 1.0);
    }

    #[test]
    fn growth_steps_at_score_thresholds() {
        let mut ship = Ship::new(1);

        for _ in 0..19 {
            ship.add_points(10);
        }
        assert_eq!(ship.score, 190);
        assert_eq!(ship.size, 1.0);

        ship.add_points(10);
        assert_eq!(ship.score, 200);
        assert!((ship.size - 1.1).abs() < f32::EPSILON);

        // Crossing two levels at once still lands on the right size
        ship.add_points(400);
        assert_eq!(ship.score, 600);
        assert!((ship.size - 1.3).abs() < 1e-6);
    }

    #[test]
    fn growth_never_shrinks() {
        let mut ship = Ship::new(1);
        ship.add_points(250);
        let grown = ship.size;
        ship.add_points(10);
        assert!(ship.size >= grown);
    }

    #[test]
    fn fired_bullet_starts_above_ship_and_travels_up() {
        let ship = Ship::new(1);
        let bullet = ship.fire(1);
        assert_eq!(bullet.owner, 1);
        assert_eq!(bullet.y, ship.y - physics::BULLET_MUZZLE_OFFSET);
        assert!(bullet.vel_y < 0.0);
    }

    #[test]
    fn bullet_motion_scales_with_dt() {
        let mut a = Ship::new(1).fire(1);
        let mut b = Ship::new(1).fire(2);

        a.advance(0.1);
        for _ in 0..10 {
            b.advance(0.01);
        }

        assert!((a.y - b.y).abs() < 1e-3);
        assert!((a.y - (Ship::new(1).y - physics::BULLET_MUZZLE_OFFSET
            - physics::BULLET_SPEED * 0.1))
            .abs()
            < 1e-3);
    }

    #[test]
    fn reset_wipes_score_but_reactivate_preserves_it() {
        let mut ship = Ship::new(1);
        ship.add_points(230);
        ship.alive = false;
        ship.x = 10.0;

        let mut returned = ship.clone();
        returned.reactivate();
        assert!(returned.alive);
        assert_eq!(returned.score, 230);
        assert_eq!(returned.x, ARENA_WIDTH / 2.0);

        ship.reset();
        assert!(ship.alive);
        assert_eq!(ship.score, 0);
        assert_eq!(ship.size, 1.0);
    }

    #[test]
    fn asteroid_culled_below_bottom_edge() {
        let mut asteroid = Asteroid {
            id: 1,
            x: 100.0,
            y: ARENA_HEIGHT,
            vel_x: 0.0,
            vel_y: 100.0,
            radius: 25.0,
            variant: 0,
        };
        assert!(!asteroid.is_off_arena());
        asteroid.advance(1.0);
        assert!(asteroid.is_off_arena());
    }
}
