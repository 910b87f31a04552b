//! Motion constants and ship kinematics
//!
//! All speeds are in pixels per second; every position update is scaled by
//! the measured tick delta so simulation speed is independent of tick rate.

use super::entities::Ship;

/// Arena dimensions in pixels
pub const ARENA_WIDTH: f32 = 1200.0;
pub const ARENA_HEIGHT: f32 = 800.0;

/// Ship translation speed
pub const SHIP_SPEED: f32 = 300.0;
/// Half extent used to clamp the ship inside the arena
pub const SHIP_HALF_EXTENT: f32 = 10.0;
/// Collision radius before the size multiplier is applied
pub const SHIP_BASE_RADIUS: f32 = 8.0;

/// Score gained per destroyed asteroid
pub const POINTS_PER_ASTEROID: i32 = 10;
/// Every this many points the ship grows one step
pub const GROWTH_THRESHOLD: i32 = 200;
/// Size multiplier gained per growth step
pub const GROWTH_INCREMENT: f32 = 0.1;

/// Bullet speed, straight up
pub const BULLET_SPEED: f32 = 480.0;
/// Bullets spawn this far above the ship center
pub const BULLET_MUZZLE_OFFSET: f32 = 12.0;
/// Bullets are culled once above this y
pub const BULLET_CULL_Y: f32 = -5.0;

/// Advance a ship by its held input. Diagonal input is normalized so the
/// speed is direction-independent, and the result is clamped to the arena.
pub fn step_ship(ship: &mut Ship, dt: f32) {
    if !ship.alive {
        return;
    }

    let mut dx = 0.0f32;
    let mut dy = 0.0f32;
    if ship.input.left {
        dx -= 1.0;
    }
    if ship.input.right {
        dx += 1.0;
    }
    if ship.input.up {
        dy -= 1.0;
    }
    if ship.input.down {
        dy += 1.0;
    }

    if dx != 0.0 || dy != 0.0 {
        let len = (dx * dx + dy * dy).sqrt();
        ship.x += dx / len * SHIP_SPEED * dt;
        ship.y += dy / len * SHIP_SPEED * dt;
        ship.heading = dy.atan2(dx);
    }

    ship.x = ship.x.clamp(SHIP_HALF_EXTENT, ARENA_WIDTH - SHIP_HALF_EXTENT);
    ship.y = ship.y.clamp(SHIP_HALF_EXTENT, ARENA_HEIGHT - SHIP_HALF_EXTENT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::MoveInput;

    #[test]
    fn motion_is_dt_proportional() {
        let mut ship = Ship::new(1);
        ship.input = MoveInput {
            right: true,
            ..Default::default()
        };

        let x0 = ship.x;
        step_ship(&mut ship, 0.5);
        assert!((ship.x - (x0 + SHIP_SPEED * 0.5)).abs() < 1e-3);
    }

    #[test]
    fn diagonal_speed_matches_axis_speed() {
        let mut straight = Ship::new(1);
        straight.input = MoveInput {
            right: true,
            ..Default::default()
        };
        let mut diagonal = Ship::new(2);
        diagonal.input = MoveInput {
            right: true,
            down: true,
            ..Default::default()
        };

        let (sx, sy) = (straight.x, straight.y);
        let (dx, dy) = (diagonal.x, diagonal.y);
        step_ship(&mut straight, 0.1);
        step_ship(&mut diagonal, 0.1);

        let straight_dist = ((straight.x - sx).powi(2) + (straight.y - sy).powi(2)).sqrt();
        let diagonal_dist = ((diagonal.x - dx).powi(2) + (diagonal.y - dy).powi(2)).sqrt();
        assert!((straight_dist - diagonal_dist).abs() < 1e-3);
    }

    #[test]
    fn ship_stays_clamped_under_sustained_input() {
        let mut ship = Ship::new(1);
        ship.input = MoveInput {
            left: true,
            up: true,
            ..Default::default()
        };

        for _ in 0..1000 {
            step_ship(&mut ship, 1.0 / 60.0);
            assert!(ship.x >= SHIP_HALF_EXTENT);
            assert!(ship.x <= ARENA_WIDTH - SHIP_HALF_EXTENT);
            assert!(ship.y >= SHIP_HALF_EXTENT);
            assert!(ship.y <= ARENA_HEIGHT - SHIP_HALF_EXTENT);
        }
        assert_eq!(ship.x, SHIP_HALF_EXTENT);
        assert_eq!(ship.y, SHIP_HALF_EXTENT);
    }

    #[test]
    fn dead_ships_do_not_move() {
        let mut ship = Ship::new(1);
        ship.alive = false;
        ship.input = MoveInput {
            right: true,
            ..Default::default()
        };
        let x0 = ship.x;
        step_ship(&mut ship, 1.0);
        assert_eq!(ship.x, x0);
    }

    #[test]
    fn heading_follows_movement_direction() {
        let mut ship = Ship::new(1);
        ship.input = MoveInput {
            up: true,
            ..Default::default()
        };
        step_ship(&mut ship, 0.01);
        assert!((ship.heading - (-std::f32::consts::FRAC_PI_2)).abs() < 1e-4);

        // Heading is kept when input stops
        ship.input = MoveInput::default();
        step_ship(&mut ship, 0.01);
        assert!((ship.heading - (-std::f32::consts::FRAC_PI_2)).abs() < 1e-4);
    }
}
