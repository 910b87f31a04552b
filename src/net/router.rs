//! Inbound message dispatch
//!
//! Each decoded message is applied synchronously in arrival order for its
//! session; cross-session interleavings are serialized by the world lock.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::app::AppState;
use crate::game::entities::MoveInput;
use crate::game::restart::VoteOutcome;

use super::broadcast;
use super::protocol::{ClientMsg, ServerMsg};
use super::session::Session;

pub async fn route(state: &Arc<AppState>, session: &Arc<Session>, msg: ClientMsg) {
    match msg {
        ClientMsg::Connect { .. } => {
            // Handshake already completed for this session
            warn!(player_id = session.id, "duplicate connect ignored");
        }

        ClientMsg::Move {
            left,
            right,
            up,
            down,
        } => {
            state.world.lock().set_input(
                session.id,
                MoveInput {
                    left,
                    right,
                    up,
                    down,
                },
            );
        }

        ClientMsg::Shoot => {
            state.world.lock().fire_bullet(session.id);
        }

        ClientMsg::Pause { paused: true } => {
            let connected = state.sessions.connected_ids();
            let started = {
                let mut world = state.world.lock();
                if world.pause.request_pause(connected) {
                    Some(world.pause.remaining() as u32)
                } else {
                    None
                }
            };

            if let Some(remaining) = started {
                debug!(player_id = session.id, remaining, "pause started");
                broadcast::to_all(
                    state,
                    &ServerMsg::PauseProgress {
                        paused: true,
                        remaining,
                        actor: session.id,
                    },
                )
                .await;
            }
        }

        ClientMsg::Pause { paused: false } => {
            let update = {
                let mut world = state.world.lock();
                if world.pause.confirm_resume(session.id) {
                    Some((world.pause.is_paused(), world.pause.remaining() as u32))
                } else {
                    None
                }
            };

            if let Some((paused, remaining)) = update {
                debug!(player_id = session.id, remaining, "resume confirmed");
                broadcast::to_all(
                    state,
                    &ServerMsg::PauseProgress {
                        paused,
                        remaining,
                        actor: session.id,
                    },
                )
                .await;
            }
        }

        ClientMsg::RestartVote => {
            let connected = state.sessions.connected_ids();
            let outcome = state.world.lock().vote_restart(session.id, &connected);

            match outcome {
                VoteOutcome::Restart => {
                    broadcast::to_all(
                        state,
                        &ServerMsg::GameOver {
                            reason: "Game restarted".to_string(),
                            final_scores: vec![],
                        },
                    )
                    .await;
                }
                VoteOutcome::Progress { current, required } => {
                    broadcast::to_all(
                        state,
                        &ServerMsg::RestartProgress {
                            current,
                            required,
                            actor: session.id,
                        },
                    )
                    .await;
                }
            }
        }

        ClientMsg::Heartbeat => {
            session.mark_heartbeat();
            let _ = session.send(&ServerMsg::HeartbeatAck).await;
        }

        ClientMsg::Personalize { model } => {
            state.world.lock().set_model(session.id, model);
        }

        ClientMsg::ReturnToGame => {
            state.world.lock().reactivate_ship(session.id);
        }

        ClientMsg::Disconnect => {
            session.close();
        }
    }
}
