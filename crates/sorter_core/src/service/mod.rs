//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs (fill views,
//!   history series, config reads/updates, deposit recording).
//! - Keep HTTP handlers decoupled from storage details.

pub mod bin_service;
pub mod config_service;
pub mod history_service;
pub mod ledger_service;
