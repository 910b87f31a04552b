//! Cooperative pause coordination
//!
//! The first pause request freezes the simulation and snapshots the set of
//! connected player ids as the pending set. The simulation resumes only once
//! every pending player has confirmed; a disconnect counts as confirmation.
//! The pending set is fixed at initiation time and only ever shrinks.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct PauseCoordinator {
    paused: bool,
    pending: HashSet<u32>,
}

impl PauseCoordinator {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Players whose resume confirmation is still outstanding
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Start a pause over the given connected players. Returns true when
    /// this request actually started a pause; repeated requests while
    /// already paused are idempotent and leave the pending set untouched.
    pub fn request_pause(&mut self, connected: impl IntoIterator<Item = u32>) -> bool {
        if self.paused {
            return false;
        }
        self.paused = true;
        self.pending = connected.into_iter().collect();
        true
    }

    /// Confirm one player's resume (explicitly, or implicitly via
    /// disconnect). Returns true when the pending set changed; a
    /// confirmation from a non-pending id is a no-op.
    pub fn confirm_resume(&mut self, id: u32) -> bool {
        if !self.pending.remove(&id) {
            return false;
        }
        if self.paused && self.pending.is_empty() {
            self.paused = false;
        }
        true
    }
}
