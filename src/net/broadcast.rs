//! Snapshot and event fan-out
//!
//! The message is encoded once, then written to every connected session
//! concurrently. A failed or timed-out write closes only that session;
//! delivery to the others is unaffected.

use futures::future::join_all;
use tracing::{debug, error};

use crate::app::AppState;

use super::codec;
use super::protocol::ServerMsg;

/// Send `msg` to every connected session
pub async fn to_all(state: &AppState, msg: &ServerMsg) {
    to_all_except(state, msg, None).await;
}

/// Send `msg` to every connected session except `exclude`
pub async fn to_all_except(state: &AppState, msg: &ServerMsg, exclude: Option<u32>) {
    let frame = match codec::encode(msg) {
        Ok(frame) => frame,
        Err(e) => {
            error!(error = %e, "failed to encode broadcast message");
            return;
        }
    };

    let sends = state
        .sessions
        .connected_sessions()
        .into_iter()
        .filter(|session| Some(session.id) != exclude)
        .map(|session| {
            let frame = frame.clone();
            async move {
                if let Err(e) = session.send_frame(&frame).await {
                    // send_frame already closed the session; its read loop
                    // will notice and run the normal teardown
                    debug!(player_id = session.id, error = %e, "broadcast write failed");
                }
            }
        });

    join_all(sends).await;
}
