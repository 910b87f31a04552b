//! Fixed-cadence simulation loop
//!
//! A variable-step loop gated at a minimum interval: each pass measures the
//! wall-clock time since the previous step and feeds it to the world as
//! `dt`, so simulation speed is independent of the achieved tick rate. The
//! collision scan runs between the two locked phases, against copies.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::app::AppState;
use crate::net::broadcast;
use crate::net::protocol::ServerMsg;

use super::{collision, snapshot};

/// Target tick cadence
pub const TICK_HZ: f32 = 144.0;

/// Run the simulation loop until shutdown
pub async fn run(state: Arc<AppState>) {
    let min_interval = Duration::from_secs_f32(1.0 / TICK_HZ);
    let mut last = Instant::now();
    let mut game_over_sent = false;
    let shutdown = state.shutdown_rx();

    info!(tick_hz = TICK_HZ, "simulation loop started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        // Small inter-tick delay; the gate below decides whether to step
        tokio::time::sleep(Duration::from_millis(1)).await;

        let now = Instant::now();
        let elapsed = now.duration_since(last);
        if elapsed < min_interval {
            continue;
        }
        last = now;
        let dt = elapsed.as_secs_f32();

        // Phase 1 under the lock: integrate motion, take probe copies.
        // None means the simulation is frozen (paused or ended) and only
        // the snapshot broadcast below still happens.
        let scan_input = state.world.lock().integrate(dt);

        // Phase 2 outside the lock: the expensive pair scan
        let outcome = scan_input.map(|input| collision::scan(&input));

        // Phase 3 under the lock: apply results, spawn, re-check ended
        let (msg, active) = {
            let mut world = state.world.lock();
            if let Some(outcome) = outcome {
                world.apply(outcome);
                world.run_spawner();
                world.check_ended();
            }
            (snapshot::build(&world), world.is_active())
        };

        broadcast::to_all(&state, &msg).await;

        if !active && !game_over_sent {
            game_over_sent = true;
            let final_scores = snapshot::ship_dtos(&state.world.lock());
            broadcast::to_all(
                &state,
                &ServerMsg::GameOver {
                    reason: "All ships were destroyed".to_string(),
                    final_scores,
                },
            )
            .await;
            info!("game over broadcast sent");
        }

        if active && game_over_sent {
            game_over_sent = false;
            debug!("game active again, game over flag re-armed");
        }
    }

    info!("simulation loop stopped");
}
