//! In-memory control plane shared by request handlers.
//!
//! # Responsibility
//! - Hold the actuator axis state and the controller command outbox.
//! - Push state changes to every connected dashboard session.
//!
//! # Invariants
//! - Nothing here is persisted; a restart resets the axis to idle/homed at 0
//!   and empties the outbox.
//! - Each resource is an explicitly owned, lock-guarded object handed to
//!   handlers; there are no process-wide globals.

pub mod axis_register;
pub mod command_queue;
pub mod fanout;
