//! Per-connection session state and the connected-session registry

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Notify;
use tracing::debug;

use super::codec;
use super::protocol::ServerMsg;

/// Sessions idle longer than this are swept
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
/// Sessions without a heartbeat for this long are swept
pub const HEARTBEAT_DEADLINE: Duration = Duration::from_secs(15);
/// A single frame read may block at most this long
pub const READ_TIMEOUT: Duration = Duration::from_secs(30);
/// A single frame write may block at most this long
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a send to a session failed; every variant closes the session
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("session already closed")]
    Closed,

    #[error("write timed out")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One live client connection. Writes go through here (broadcast and
/// direct replies); the read loop owns the other half of the socket.
pub struct Session {
    pub id: u32,
    name: Mutex<Option<String>>,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    connected: AtomicBool,
    /// Set once the connect handshake completed; broadcasts and the
    /// connected-player sets only consider ready sessions
    ready: AtomicBool,
    closing: Notify,
    last_activity: Mutex<Instant>,
    last_heartbeat: Mutex<Instant>,
}

impl Session {
    pub fn new(id: u32, writer: OwnedWriteHalf) -> Self {
        let now = Instant::now();
        Self {
            id,
            name: Mutex::new(None),
            writer: tokio::sync::Mutex::new(writer),
            connected: AtomicBool::new(true),
            ready: AtomicBool::new(false),
            closing: Notify::new(),
            last_activity: Mutex::new(now),
            last_heartbeat: Mutex::new(now),
        }
    }

    /// Display name, set once the connect handshake succeeds
    pub fn name(&self) -> Option<String> {
        self.name.lock().clone()
    }

    pub fn set_name(&self, name: String) {
        *self.name.lock() = Some(name);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Handshake completed; the session now takes part in broadcasts,
    /// pause captures and restart vote counts
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Mark the session dead and wake its read loop
    pub fn close(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.closing.notify_waiters();
            debug!(player_id = self.id, "session closed");
        }
    }

    /// Resolves once the session has been closed. The notified future is
    /// registered before the flag check so a concurrent close cannot be
    /// missed.
    pub async fn closed(&self) {
        let notified = self.closing.notified();
        if !self.is_connected() {
            return;
        }
        notified.await;
    }

    /// Record inbound activity for the idle sweep
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn mark_heartbeat(&self) {
        *self.last_heartbeat.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    pub fn heartbeat_age(&self) -> Duration {
        self.last_heartbeat.lock().elapsed()
    }

    /// Write one pre-encoded frame. Any failure closes the session so
    /// subsequent broadcasts skip it.
    pub async fn send_frame(&self, frame: &[u8]) -> Result<(), SendError> {
        if !self.is_connected() {
            return Err(SendError::Closed);
        }

        let mut writer = self.writer.lock().await;
        match tokio::time::timeout(WRITE_TIMEOUT, writer.write_all(frame)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.close();
                Err(e.into())
            }
            Err(_) => {
                self.close();
                Err(SendError::Timeout)
            }
        }
    }

    /// Encode and send one message to this session
    pub async fn send(&self, msg: &ServerMsg) -> Result<(), SendError> {
        let frame = codec::encode(msg)?;
        self.send_frame(&frame).await
    }

    /// Flush and shut down the write half during teardown
    pub async fn shutdown_writer(&self) {
        let _ = self.writer.lock().await.shutdown().await;
    }
}

/// All sessions the server currently knows about, plus the player-id
/// allocator and the display-name uniqueness table.
pub struct SessionRegistry {
    sessions: DashMap<u32, Arc<Session>>,
    names: Mutex<HashMap<String, u32>>,
    next_id: AtomicU32,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            names: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// Monotonically increasing player ids, starting at 1
    pub fn allocate_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn insert(&self, session: Arc<Session>) {
        self.sessions.insert(session.id, session);
    }

    pub fn remove(&self, id: u32) -> Option<Arc<Session>> {
        self.sessions.remove(&id).map(|(_, s)| s)
    }

    pub fn get(&self, id: u32) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|s| s.value().clone())
    }

    /// Reserve `name` for `id`. Fails when another *connected* session
    /// holds it; names of disconnected sessions are free for reuse.
    pub fn claim_name(&self, name: &str, id: u32) -> bool {
        let mut names = self.names.lock();
        if let Some(owner) = names.get(name) {
            let owner_connected = *owner != id
                && self
                    .sessions
                    .get(owner)
                    .map_or(false, |s| s.is_connected());
            if owner_connected {
                return false;
            }
        }
        names.insert(name.to_string(), id);
        true
    }

    /// Free a name at teardown; only the owning session may release it
    pub fn release_name(&self, name: &str, id: u32) {
        let mut names = self.names.lock();
        if names.get(name) == Some(&id) {
            names.remove(name);
        }
    }

    /// Ids of all fully connected (handshaken) sessions
    pub fn connected_ids(&self) -> HashSet<u32> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().is_connected() && entry.value().is_ready())
            .map(|entry| *entry.key())
            .collect()
    }

    pub fn connected_sessions(&self) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().is_connected() && entry.value().is_ready())
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every session; pending socket I/O unblocks with errors
    pub fn close_all(&self) {
        for entry in self.sessions.iter() {
            entry.value().close();
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpStream};

    /// Open a loopback socket pair and wrap the server side in a session
    async fn loopback_session(id: u32) -> (Arc<Session>, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server_side, _) = listener.accept().await.unwrap();
        let (_, write_half) = server_side.into_split();
        let session = Arc::new(Session::new(id, write_half));
        session.mark_ready();
        (session, client)
    }

    #[tokio::test]
    async fn ids_are_monotonic_from_one() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.allocate_id(), 1);
        assert_eq!(registry.allocate_id(), 2);
        assert_eq!(registry.allocate_id(), 3);
    }

    #[tokio::test]
    async fn name_claims_enforce_uniqueness_among_connected() {
        let registry = SessionRegistry::new();
        let (ana, _ana_socket) = loopback_session(1).await;
        let (other, _other_socket) = loopback_session(2).await;
        registry.insert(ana.clone());
        registry.insert(other.clone());

        assert!(registry.claim_name("Ana", 1));
        assert!(!registry.claim_name("Ana", 2));

        // Once Ana disconnects her name is free again
        ana.close();
        assert!(registry.claim_name("Ana", 2));
    }

    #[tokio::test]
    async fn release_only_honors_the_owner() {
        let registry = SessionRegistry::new();
        let (ana, _socket) = loopback_session(1).await;
        registry.insert(ana);
        assert!(registry.claim_name("Ana", 1));

        // A stale release from another id must not free the name
        registry.release_name("Ana", 2);
        assert!(!registry.claim_name("Ana", 3));

        registry.release_name("Ana", 1);
        assert!(registry.claim_name("Ana", 3));
    }

    #[tokio::test]
    async fn closed_sessions_leave_the_connected_set() {
        let registry = SessionRegistry::new();
        let (a, _sa) = loopback_session(1).await;
        let (b, _sb) = loopback_session(2).await;
        registry.insert(a.clone());
        registry.insert(b);

        assert_eq!(registry.connected_ids().len(), 2);
        a.close();
        let ids = registry.connected_ids();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&2));
    }

    #[tokio::test]
    async fn send_after_close_fails_fast() {
        let (session, _client) = loopback_session(1).await;
        session.close();
        let err = session.send(&ServerMsg::HeartbeatAck).await.unwrap_err();
        assert!(matches!(err, SendError::Closed));
    }

    #[tokio::test]
    async fn closed_future_resolves_for_already_closed_session() {
        let (session, _client) = loopback_session(1).await;
        session.close();
        // Must not hang
        tokio::time::timeout(Duration::from_secs(1), session.closed())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn sent_frames_arrive_on_the_client_socket() {
        use tokio::io::AsyncReadExt;

        let (session, mut client) = loopback_session(1).await;
        session.send(&ServerMsg::ConnectAck { player_id: 1 }).await.unwrap();

        let mut len_buf = [0u8; 4];
        client.read_exact(&mut len_buf).await.unwrap();
        let len = u32::from_le_bytes(len_buf) as usize;
        let mut payload = vec![0u8; len];
        client.read_exact(&mut payload).await.unwrap();

        let msg: ServerMsg = serde_json::from_slice(&payload).unwrap();
        assert_eq!(msg, ServerMsg::ConnectAck { player_id: 1 });
    }
}
