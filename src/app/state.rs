//! Application state shared across all server loops

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::Config;
use crate::game::World;
use crate::net::session::SessionRegistry;

/// Shared application state
pub struct AppState {
    pub config: Arc<Config>,
    /// The single coarse lock over all simulation state. Held only for
    /// short mutations; the collision scan runs on copies outside it.
    pub world: Mutex<World>,
    pub sessions: SessionRegistry,
    shutdown_tx: watch::Sender<bool>,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let (shutdown_tx, _) = watch::channel(false);

        Arc::new(Self {
            config: Arc::new(config),
            world: Mutex::new(World::new()),
            sessions: SessionRegistry::new(),
            shutdown_tx,
        })
    }

    /// A fresh receiver for the running flag; flips to true on shutdown
    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Flip the running flag and close every socket so pending I/O in the
    /// per-session loops unblocks with errors.
    pub fn begin_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        self.sessions.close_all();
    }
}
