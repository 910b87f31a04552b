//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Inbound frame budget per session. Generous: a client holding keys and
/// heartbeating stays far below this even at full tick rate.
pub const FRAME_RATE_LIMIT: u32 = 240;

/// Per-session rate limiter state
#[derive(Clone)]
pub struct SessionRateLimiter {
    frame_limiter: Arc<Limiter>,
}

impl SessionRateLimiter {
    pub fn new() -> Self {
        Self {
            frame_limiter: create_limiter(FRAME_RATE_LIMIT),
        }
    }

    /// Check if an inbound frame is allowed (returns true if allowed)
    pub fn check_frame(&self) -> bool {
        self.frame_limiter.check().is_ok()
    }
}

impl Default for SessionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_frames_under_the_budget() {
        let limiter = SessionRateLimiter::new();
        // The quota allows an initial burst; a handful must pass
        for _ in 0..10 {
            assert!(limiter.check_frame());
        }
    }

    #[test]
    fn rejects_a_sustained_flood() {
        let limiter = SessionRateLimiter::new();
        let mut rejected = false;
        for _ in 0..10_000 {
            if !limiter.check_frame() {
                rejected = true;
                break;
            }
        }
        assert!(rejected);
    }
}
