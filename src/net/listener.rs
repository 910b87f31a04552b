//! TCP accept loop, connect handshake and per-session read loop

use std::sync::Arc;
use std::time::Duration;

use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::snapshot;
use crate::util::rate_limit::SessionRateLimiter;

use super::codec::{self, DecodeError, FrameError, FrameReader};
use super::protocol::{ClientMsg, ServerMsg};
use super::session::{SendError, Session, READ_TIMEOUT};
use super::{broadcast, router};

/// Accept connections until shutdown, one read task per session
pub async fn serve(state: Arc<AppState>, listener: TcpListener) {
    let mut shutdown = state.shutdown_rx();

    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "accepting connections");
    }

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let id = state.sessions.allocate_id();
                    let (read_half, write_half) = stream.into_split();
                    let session = Arc::new(Session::new(id, write_half));
                    state.sessions.insert(session.clone());

                    info!(player_id = id, %peer, "client connected");

                    let state = state.clone();
                    tokio::spawn(async move {
                        handle_connection(state, session, read_half).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "accept failed");
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            },
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("accept loop stopped");
}

async fn handle_connection(state: Arc<AppState>, session: Arc<Session>, read_half: OwnedReadHalf) {
    let mut reader = FrameReader::new(read_half);

    match handshake(&state, &session, &mut reader).await {
        Ok(()) => read_loop(&state, &session, &mut reader).await,
        Err(e) => debug!(player_id = session.id, error = %e, "handshake failed"),
    }

    teardown(&state, &session).await;
}

#[derive(Debug, thiserror::Error)]
enum HandshakeError {
    #[error("timed out waiting for connect")]
    Timeout,

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("first frame was not connect")]
    NotConnect,

    #[error("display name already in use")]
    NameTaken,

    #[error(transparent)]
    Send(#[from] SendError),
}

/// Connect handshake: first frame must be `connect{name}`. On success the
/// client gets its ack and one immediate full snapshot, its ship enters
/// the world and everyone else learns about the new player.
async fn handshake(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    reader: &mut FrameReader<OwnedReadHalf>,
) -> Result<(), HandshakeError> {
    let payload = timeout(READ_TIMEOUT, reader.read_frame())
        .await
        .map_err(|_| HandshakeError::Timeout)??;
    session.touch();

    let name = match codec::decode_client(&payload)? {
        ClientMsg::Connect { name } => name,
        _ => return Err(HandshakeError::NotConnect),
    };

    if !state.sessions.claim_name(&name, session.id) {
        warn!(player_id = session.id, name = %name, "display name already in use");
        let _ = session
            .send(&ServerMsg::ConnectError {
                reason: format!("display name \"{name}\" is already in use"),
            })
            .await;
        return Err(HandshakeError::NameTaken);
    }
    session.set_name(name.clone());

    session
        .send(&ServerMsg::ConnectAck {
            player_id: session.id,
        })
        .await?;

    // One immediate full snapshot so the client can render right away
    let initial = snapshot::build(&state.world.lock());
    session.send(&initial).await?;

    // From here on the session receives broadcasts and counts towards
    // pause captures and restart vote requirements
    session.mark_ready();

    state.world.lock().spawn_ship(session.id);

    broadcast::to_all_except(
        state,
        &ServerMsg::PlayerJoined {
            player_id: session.id,
            name: name.clone(),
        },
        Some(session.id),
    )
    .await;

    info!(player_id = session.id, name = %name, "player joined the game");
    Ok(())
}

/// Pump frames off the socket until the session dies. Undecodable frames
/// are dropped; framing violations and timeouts end the connection.
async fn read_loop(
    state: &Arc<AppState>,
    session: &Arc<Session>,
    reader: &mut FrameReader<OwnedReadHalf>,
) {
    let limiter = SessionRateLimiter::new();

    while session.is_connected() {
        let payload = tokio::select! {
            _ = session.closed() => break,
            result = timeout(READ_TIMEOUT, reader.read_frame()) => match result {
                Err(_) => {
                    debug!(player_id = session.id, "read timed out");
                    break;
                }
                Ok(Err(FrameError::TooLarge(bytes))) => {
                    warn!(player_id = session.id, bytes, "oversized frame, disconnecting");
                    break;
                }
                Ok(Err(FrameError::Io(e))) => {
                    debug!(player_id = session.id, error = %e, "connection lost");
                    break;
                }
                Ok(Ok(payload)) => payload,
            }
        };

        session.touch();

        if !limiter.check_frame() {
            warn!(player_id = session.id, "inbound frame rate exceeded, dropping");
            continue;
        }

        match codec::decode_client(&payload) {
            Ok(msg) => router::route(state, session, msg).await,
            Err(e) => {
                warn!(player_id = session.id, error = %e, "dropping undecodable frame");
            }
        }
    }
}

/// Remove every trace of a session: registry entry, display name, ship,
/// outstanding pause/vote membership. Runs exactly once per connection,
/// after its read loop ends.
async fn teardown(state: &Arc<AppState>, session: &Arc<Session>) {
    session.close();
    state.sessions.remove(session.id);

    let name = session.name();
    if let Some(name) = &name {
        state.sessions.release_name(name, session.id);
    }

    session.shutdown_writer().await;

    let pause_update = {
        let mut world = state.world.lock();
        world.remove_ship(session.id);
        world.votes.remove(session.id);
        // Leaving counts as a resume confirmation so a pause can never
        // deadlock on a lost peer
        if world.pause.confirm_resume(session.id) {
            Some((world.pause.is_paused(), world.pause.remaining() as u32))
        } else {
            None
        }
    };

    if let Some((paused, remaining)) = pause_update {
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

    // Only announce players that completed the handshake
    if name.is_some() {
        broadcast::to_all(
            state,
            &ServerMsg::PlayerLeft {
                player_id: session.id,
            },
        )
        .await;
    }

    info!(player_id = session.id, name = ?name, "client disconnected");
}
