//! Single-slot command outbox polled by the controller.
//!
//! # Invariants
//! - At most one pending value per command kind; a newer enqueue overwrites
//!   the older one (latest intent wins).
//! - `drain` swaps the whole slot for an empty one under the lock, so it
//!   clears exactly what it returns and never erases a later enqueue.

use crate::model::command::{CommandPatch, PendingCommands};
use log::info;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct CommandQueue {
    slot: Mutex<PendingCommands>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the slot of every field present in `patch`.
    ///
    /// Returns the pending commands after the write.
    pub fn enqueue(&self, patch: &CommandPatch) -> PendingCommands {
        let mut slot = self.lock();
        if let Some(jog_mm) = patch.jog_mm {
            slot.jog_mm = Some(jog_mm);
        }
        if let Some(home) = patch.home {
            slot.home = home;
        }
        info!(
            "event=command_enqueue module=control status=ok jog_mm={:?} home={}",
            slot.jog_mm, slot.home
        );
        slot.clone()
    }

    /// Returns the pending commands and leaves the slot empty.
    pub fn drain(&self) -> PendingCommands {
        std::mem::take(&mut *self.lock())
    }

    /// Non-destructive read.
    pub fn peek(&self) -> PendingCommands {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PendingCommands> {
        // Every write completes under the guard, so a poisoned slot is still
        // consistent.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
