//! Shared handler state.
//!
//! # Invariants
//! - The axis register, command queue and fanout live for the whole
//!   process and are shared by every request and websocket session.
//! - Database work never runs on the async executor: each call opens its
//!   own connection on the blocking pool.

use crate::config::ServerConfig;
use crate::error::AppError;
use log::info;
use rusqlite::Connection;
use sorter_core::db::open_db;
use sorter_core::{
    AxisRegister, BinReconcileReport, BinRepository, CommandQueue, Fanout, RepoError,
    SqliteBinRepository,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub axis: Arc<AxisRegister>,
    pub commands: Arc<CommandQueue>,
    pub fanout: Fanout,
    db_path: Arc<PathBuf>,
}

impl AppState {
    /// Builds the process state from `config`. Does not touch the database.
    pub fn new(config: ServerConfig) -> Self {
        let fanout = Fanout::new(config.fanout_buffer);
        let axis = AxisRegister::new(fanout.clone(), config.homing_mode, config.homing_delay);
        Self {
            db_path: Arc::new(config.db_path.clone()),
            config: Arc::new(config),
            axis: Arc::new(axis),
            commands: Arc::new(CommandQueue::new()),
            fanout,
        }
    }

    /// Migrates the database and repairs the bin table. Run once at startup.
    pub fn prepare_database(&self) -> Result<BinReconcileReport, RepoError> {
        let conn = open_db(self.db_path.as_path())?;
        let report = SqliteBinRepository::new(&conn).reconcile_canonical_bins()?;
        info!(
            "event=db_prepare module=server status=ok path={} removed={} inserted={}",
            self.db_path.display(),
            report.removed,
            report.inserted
        );
        Ok(report)
    }

    /// Runs `work` against a fresh connection on the blocking pool.
    pub async fn with_conn<T, F>(&self, work: F) -> Result<T, AppError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
    {
        let db_path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let mut conn = open_db(db_path.as_path())?;
            work(&mut conn)
        })
        .await?
    }
}
