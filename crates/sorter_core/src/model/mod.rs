//! Domain model for the sorter backend.
//!
//! # Responsibility
//! - Define the ledger, bin, config and axis records shared by repositories,
//!   services and the control plane.
//! - Define inbound request shapes as explicit optional-field structs.
//!
//! # Invariants
//! - Bin fill state is derived from the deposit ledger, never stored.
//! - Omitted request fields always mean "keep the previous value".

pub mod axis;
pub mod bin;
pub mod coerce;
pub mod command;
pub mod config;
pub mod deposit;
pub mod time;
