//! Background liveness sweeps
//!
//! Two independent checks: a general inactivity timeout over any inbound
//! traffic, and a stricter heartbeat deadline. Both only close the
//! offending session; its read loop then runs the normal teardown.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::AppState;

use super::session::{HEARTBEAT_DEADLINE, IDLE_TIMEOUT};

/// Period of both sweeps
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Disconnect sessions with no inbound traffic for `IDLE_TIMEOUT`
pub async fn run_idle_sweep(state: Arc<AppState>) {
    let shutdown = state.shutdown_rx();
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        interval.tick().await;
        if *shutdown.borrow() {
            break;
        }

        for session in state.sessions.connected_sessions() {
            if session.idle_for() > IDLE_TIMEOUT {
                info!(player_id = session.id, "session idle past timeout, disconnecting");
                session.close();
            }
        }
    }
}

/// Disconnect sessions whose last heartbeat is older than the deadline
pub async fn run_heartbeat_sweep(state: Arc<AppState>) {
    let shutdown = state.shutdown_rx();
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        interval.tick().await;
        if *shutdown.borrow() {
            break;
        }

        for session in state.sessions.connected_sessions() {
            if session.heartbeat_age() > HEARTBEAT_DEADLINE {
                info!(player_id = session.id, "heartbeat deadline missed, disconnecting");
                session.close();
            }
        }
    }
}
