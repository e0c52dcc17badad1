//! Config use-case service.
//!
//! # Invariants
//! - A missing config row is never an error; documented defaults apply.
//! - Updates go through the repository's transactional merge only.

use crate::model::config::{ConfigPatch, MotionConfig};
use crate::repo::config_repo::ConfigRepository;
use crate::repo::RepoResult;
use log::info;

/// Use-case wrapper for reading and updating the config record.
pub struct ConfigService<R: ConfigRepository> {
    repo: R,
}

impl<R: ConfigRepository> ConfigService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the stored config, or defaults when unset.
    pub fn get(&self) -> RepoResult<MotionConfig> {
        Ok(self.repo.load()?.unwrap_or_default())
    }

    /// Validates and persists a partial update, returning the merged record.
    pub fn update(&mut self, patch: &ConfigPatch) -> RepoResult<MotionConfig> {
        let merged = self.repo.merge(patch)?;
        info!(
            "event=config_update module=service status=ok threshold_percent={} positions={:?}",
            merged.threshold_percent, merged.bin_positions_mm
        );
        Ok(merged)
    }
}
