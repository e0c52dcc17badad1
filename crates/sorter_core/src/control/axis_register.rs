//! Actuator axis state machine shared by dashboard commands and the
//! simulated homing completion.
//!
//! # Responsibility
//! - Apply jog, home and direct state pushes to one in-memory `AxisState`.
//! - Publish the full snapshot on the `axis` topic after every mutation.
//!
//! # Invariants
//! - All mutations are serialized by one lock, and the snapshot is published
//!   while the lock is held, so subscribers observe snapshots in mutation
//!   order and never a half-applied update.
//! - `home()` moves to `HOMING` with `homed=false` immediately; the delayed
//!   completion moves to `IDLE`, `homed=true`, `pos_mm=0`.
//! - In [`HomingMode::Latest`] only the completion of the most recent
//!   `home()` applies; earlier ones are no-ops.

use crate::control::fanout::{Fanout, Topic};
use crate::model::axis::{AxisState, AxisStatePatch, MotionState};
use crate::model::time::now_timestamp;
use log::{debug, info};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_HOMING_DELAY: Duration = Duration::from_secs(2);

/// How overlapping homing completions are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HomingMode {
    /// A completion applies only if no newer `home()` was issued.
    #[default]
    Latest,
    /// Every completion applies, even when superseded.
    Every,
}

impl HomingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Every => "every",
        }
    }
}

impl Display for HomingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomingMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "every" => Ok(Self::Every),
            other => Err(format!(
                "unsupported homing mode `{other}`; expected latest|every"
            )),
        }
    }
}

/// Identifies one `home()` request for its delayed completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomingTicket {
    generation: u64,
}

struct AxisSlot {
    state: AxisState,
    homing_generation: u64,
}

/// Lock-guarded owner of the live axis state.
pub struct AxisRegister {
    slot: Mutex<AxisSlot>,
    fanout: Fanout,
    mode: HomingMode,
    homing_delay: Duration,
}

impl AxisRegister {
    /// Creates a register in the process-start state.
    pub fn new(fanout: Fanout, mode: HomingMode, homing_delay: Duration) -> Self {
        Self {
            slot: Mutex::new(AxisSlot {
                state: AxisState::default(),
                homing_generation: 0,
            }),
            fanout,
            mode,
            homing_delay,
        }
    }

    pub fn snapshot(&self) -> AxisState {
        self.lock().state.clone()
    }

    pub fn homing_delay(&self) -> Duration {
        self.homing_delay
    }

    /// Relative move: position shifts by `mm` at once and the state becomes
    /// `MOVING` (it stays there until something else changes it).
    pub fn jog(&self, mm: f64) -> AxisState {
        let state = self.mutate(|slot| {
            slot.state.pos_mm += mm;
            slot.state.state = MotionState::Moving;
        });
        info!(
            "event=axis_jog module=control status=ok mm={} pos_mm={}",
            mm, state.pos_mm
        );
        state
    }

    /// Applies a partial state push; absent fields keep their value.
    pub fn set_state(&self, patch: AxisStatePatch) -> AxisState {
        let AxisStatePatch {
            state,
            homed,
            pos_mm,
            ts,
        } = patch;
        let stamped = ts.filter(|ts| !ts.trim().is_empty());

        let snapshot = self.mutate(move |slot| {
            if let Some(state) = state {
                slot.state.state = MotionState::from(state);
            }
            if let Some(homed) = homed {
                slot.state.homed = homed;
            }
            if let Some(pos_mm) = pos_mm {
                slot.state.pos_mm = pos_mm;
            }
            if let Some(ts) = stamped {
                slot.state.ts = Some(ts);
            }
        });
        debug!(
            "event=axis_set_state module=control status=ok state={} homed={} pos_mm={}",
            snapshot.state, snapshot.homed, snapshot.pos_mm
        );
        snapshot
    }

    /// Enters `HOMING` and returns the ticket its completion must present.
    pub fn begin_homing(&self) -> (AxisState, HomingTicket) {
        let mut ticket = HomingTicket { generation: 0 };
        let state = self.mutate(|slot| {
            slot.homing_generation += 1;
            ticket.generation = slot.homing_generation;
            slot.state.state = MotionState::Homing;
            slot.state.homed = false;
        });
        info!(
            "event=axis_home module=control status=start generation={}",
            ticket.generation
        );
        (state, ticket)
    }

    /// Finishes the homing cycle identified by `ticket`.
    ///
    /// Returns `None` when the ticket was superseded (in `Latest` mode).
    pub fn complete_homing(&self, ticket: HomingTicket) -> Option<AxisState> {
        let mut slot = self.lock();
        if self.mode == HomingMode::Latest && ticket.generation != slot.homing_generation {
            debug!(
                "event=axis_home module=control status=superseded generation={} current={}",
                ticket.generation, slot.homing_generation
            );
            return None;
        }

        slot.state.state = MotionState::Idle;
        slot.state.homed = true;
        slot.state.pos_mm = 0.0;
        slot.state.ts = Some(now_timestamp());
        let state = self.publish_locked(&slot);
        drop(slot);

        info!(
            "event=axis_home module=control status=ok generation={}",
            ticket.generation
        );
        Some(state)
    }

    /// Starts homing and schedules its completion after the homing delay.
    ///
    /// Must be called from within a Tokio runtime. The returned handle
    /// resolves to the completion's outcome; dropping it detaches the task.
    pub fn home(self: &Arc<Self>) -> (AxisState, JoinHandle<Option<AxisState>>) {
        let (state, ticket) = self.begin_homing();
        let register = Arc::clone(self);
        let completion = tokio::spawn(async move {
            tokio::time::sleep(register.homing_delay).await;
            register.complete_homing(ticket)
        });
        (state, completion)
    }

    /// Stamps `now`, applies `apply` (which may override the stamp) and
    /// publishes the result, all under the lock.
    fn mutate(&self, apply: impl FnOnce(&mut AxisSlot)) -> AxisState {
        let mut slot = self.lock();
        slot.state.ts = Some(now_timestamp());
        apply(&mut slot);
        self.publish_locked(&slot)
    }

    /// Publishes and returns the snapshot. Caller holds the lock.
    fn publish_locked(&self, slot: &AxisSlot) -> AxisState {
        let snapshot = slot.state.clone();
        self.fanout.publish(Topic::Axis, &snapshot);
        snapshot
    }

    fn lock(&self) -> MutexGuard<'_, AxisSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
