//! Asteroid spawn scheduling and difficulty scaling
//!
//! Difficulty is purely a function of accumulated simulation-clock seconds:
//! the spawn interval shrinks toward a floor, the burst size grows toward a
//! cap, and fall speed ramps with elapsed time plus random jitter. The
//! schedule keeps the original 60 fps frame counts as its reference.

use rand::Rng;

use super::entities::Asteroid;
use super::physics::ARENA_WIDTH;

/// Asteroids enter just above the top edge
pub const SPAWN_Y: f32 = -30.0;
/// Asteroid radius range in pixels
pub const MIN_RADIUS: f32 = 20.0;
pub const MAX_RADIUS: f32 = 30.0;
/// Base fall speed at clock zero
pub const BASE_FALL_SPEED: f32 = 90.0;
/// Fall speed gained per elapsed second
pub const FALL_SPEED_RAMP: f32 = 0.6;
/// Random extra fall speed, uniform in [0, this)
pub const FALL_SPEED_JITTER: f32 = 90.0;
/// Number of cosmetic texture variants
pub const TEXTURE_VARIANTS: u8 = 4;

/// Seconds between spawn bursts: starts at 1.5 s and loses one reference
/// frame (1/60 s) per 20 s of play, floored at 0.5 s.
pub fn spawn_interval(elapsed_secs: f32) -> f32 {
    let frames = (90.0 - (elapsed_secs / 20.0).floor()).max(30.0);
    frames / 60.0
}

/// Asteroids per burst, stepping up minute by minute and capped at 6
pub fn burst_count(elapsed_secs: f32) -> u32 {
    let secs = elapsed_secs as u32;
    match secs {
        0..=59 => 1,
        60..=119 => 2,
        120..=239 => 3,
        240..=359 => 4,
        360..=479 => 5,
        _ => (3 + secs / 120).min(6),
    }
}

/// Roll one asteroid: random x across the arena, downward velocity with
/// time-ramped base speed and jitter, random radius and texture variant.
pub fn roll_asteroid<R: Rng>(rng: &mut R, id: u32, elapsed_secs: f32) -> Asteroid {
    let x = rng.gen_range(0.0..ARENA_WIDTH);
    let vel_y = BASE_FALL_SPEED + elapsed_secs * FALL_SPEED_RAMP + rng.gen::<f32>() * FALL_SPEED_JITTER;
    let radius = rng.gen_range(MIN_RADIUS..MAX_RADIUS);
    let variant = rng.gen_range(0..TEXTURE_VARIANTS);

    Asteroid {
        id,
        x,
        y: SPAWN_Y,
        vel_x: 0.0,
        vel_y,
        radius,
        variant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn interval_shrinks_from_initial_to_floor() {
        assert!((spawn_interval(0.0) - 1.5).abs() < 1e-6);
        // One reference frame shorter after 20 seconds
        assert!((spawn_interval(20.0) - (89.0 / 60.0)).abs() < 1e-6);
        // Floored at half a second no matter how long the game runs
        assert!((spawn_interval(100_000.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interval_is_monotonically_non_increasing() {
        let mut previous = spawn_interval(0.0);
        for secs in (0..2000).map(|s| s as f32) {
            let current = spawn_interval(secs);
            assert!(current <= previous + 1e-6);
            previous = current;
        }
    }

    #[test]
    fn burst_count_steps_up_and_caps() {
        assert_eq!(burst_count(0.0), 1);
        assert_eq!(burst_count(59.9), 1);
        assert_eq!(burst_count(60.0), 2);
        assert_eq!(burst_count(120.0), 3);
        assert_eq!(burst_count(240.0), 4);
        assert_eq!(burst_count(360.0), 5);
        assert_eq!(burst_count(479.0), 5);
        assert_eq!(burst_count(480.0), 6); // 3 + 480/120 = 7, capped at 6
        assert_eq!(burst_count(10_000.0), 6);
    }

    #[test]
    fn rolled_asteroids_fall_faster_over_time() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let early = roll_asteroid(&mut rng, 1, 0.0);
        assert!(early.vel_y >= BASE_FALL_SPEED);
        assert!(early.vel_y < BASE_FALL_SPEED + FALL_SPEED_JITTER);

        let late = roll_asteroid(&mut rng, 2, 600.0);
        assert!(late.vel_y >= BASE_FALL_SPEED + 600.0 * FALL_SPEED_RAMP);
    }

    #[test]
    fn rolled_asteroids_spawn_above_the_arena_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for id in 0..100 {
            let asteroid = roll_asteroid(&mut rng, id, 30.0);
            assert_eq!(asteroid.y, SPAWN_Y);
            assert!(asteroid.x >= 0.0 && asteroid.x < ARENA_WIDTH);
            assert!(asteroid.radius >= MIN_RADIUS && asteroid.radius < MAX_RADIUS);
            assert!(asteroid.variant < TEXTURE_VARIANTS);
        }
    }
}
