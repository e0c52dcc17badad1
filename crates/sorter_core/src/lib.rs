//! Core domain logic for the waste-sorter backend.
//! This crate is the single source of truth for ledger, bin-fill, config and
//! axis-control invariants.

pub mod control;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use control::axis_register::{AxisRegister, HomingMode, HomingTicket, DEFAULT_HOMING_DELAY};
pub use control::command_queue::CommandQueue;
pub use control::fanout::{Fanout, FanoutMessage, FanoutSubscription, Topic, DEFAULT_FANOUT_BUFFER};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::axis::{AxisState, AxisStatePatch, MotionState};
pub use model::bin::{fill_percent, Bin, BinId, BinView, CANONICAL_BIN_IDS};
pub use model::command::{CommandPatch, PendingCommands};
pub use model::config::{
    ConfigPatch, ConfigValidationError, ConfigView, FirmwareAxisConfig, MotionConfig,
};
pub use model::deposit::{DepositEvent, DepositReport, DepositValidationError, MAX_DELTA_G_ABS};
pub use repo::bin_repo::{BinReconcileReport, BinRepository, SqliteBinRepository};
pub use repo::config_repo::{ConfigRepository, SqliteConfigRepository};
pub use repo::ledger_repo::{DailyBinTotal, LedgerRepository, SqliteLedgerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::bin_service::BinService;
pub use service::config_service::ConfigService;
pub use service::history_service::{DepositHistory, HistoryService};
pub use service::ledger_service::{LedgerService, LedgerServiceError};

/// Minimal health-check API for the server and CLI probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
