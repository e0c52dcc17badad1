//! Config row contract and SQLite implementation.
//!
//! # Responsibility
//! - Load the singleton config row, tolerating a missing row or NULL columns.
//! - Apply partial updates as one read-merge-write transaction.
//!
//! # Invariants
//! - `merge` takes the write lock before reading (`BEGIN IMMEDIATE`), so two
//!   concurrent merges serialize instead of losing one update.
//! - A rejected merge leaves the stored row untouched.
//! - `bin_positions_mm` is stored as JSON text and decoded with `serde_json`.

use crate::model::config::{clamp_threshold, ConfigPatch, MotionConfig};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

/// Repository interface for the singleton config record.
pub trait ConfigRepository {
    /// Returns the stored record, or `None` when no row exists yet.
    fn load(&self) -> RepoResult<Option<MotionConfig>>;
    /// Merges `patch` into the stored (or default) record and persists it.
    fn merge(&mut self, patch: &ConfigPatch) -> RepoResult<MotionConfig>;
}

/// SQLite-backed config repository.
pub struct SqliteConfigRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteConfigRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl ConfigRepository for SqliteConfigRepository<'_> {
    fn load(&self) -> RepoResult<Option<MotionConfig>> {
        read_config(&*self.conn)
    }

    fn merge(&mut self, patch: &ConfigPatch) -> RepoResult<MotionConfig> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = read_config(&tx)?.unwrap_or_default();
        let merged = current.merged(patch)?;
        let positions = serde_json::to_string(&merged.bin_positions_mm).map_err(|err| {
            RepoError::InvalidData(format!("cannot encode bin_positions_mm: {err}"))
        })?;

        tx.execute(
            "INSERT INTO config (
                id,
                steps_per_mm,
                v_max_mm_s,
                a_max_mm_s2,
                bin_positions_mm,
                threshold_percent
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                steps_per_mm = excluded.steps_per_mm,
                v_max_mm_s = excluded.v_max_mm_s,
                a_max_mm_s2 = excluded.a_max_mm_s2,
                bin_positions_mm = excluded.bin_positions_mm,
                threshold_percent = excluded.threshold_percent;",
            params![
                merged.steps_per_mm,
                merged.v_max_mm_s,
                merged.a_max_mm_s2,
                positions,
                merged.threshold_percent,
            ],
        )?;
        tx.commit()?;

        Ok(merged)
    }
}

fn read_config(conn: &Connection) -> RepoResult<Option<MotionConfig>> {
    let mut stmt = conn.prepare(
        "SELECT steps_per_mm, v_max_mm_s, a_max_mm_s2, bin_positions_mm, threshold_percent
         FROM config
         WHERE id = 1;",
    )?;
    let row = stmt.query_row([], parse_config_columns).optional()?;
    row.map(StoredConfig::into_config).transpose()
}

/// Raw column values; every column is nullable in the schema.
struct StoredConfig {
    steps_per_mm: Option<f64>,
    v_max_mm_s: Option<f64>,
    a_max_mm_s2: Option<f64>,
    bin_positions_mm: Option<String>,
    threshold_percent: Option<i64>,
}

fn parse_config_columns(row: &Row<'_>) -> rusqlite::Result<StoredConfig> {
    Ok(StoredConfig {
        steps_per_mm: row.get("steps_per_mm")?,
        v_max_mm_s: row.get("v_max_mm_s")?,
        a_max_mm_s2: row.get("a_max_mm_s2")?,
        bin_positions_mm: row.get("bin_positions_mm")?,
        threshold_percent: row.get("threshold_percent")?,
    })
}

impl StoredConfig {
    fn into_config(self) -> RepoResult<MotionConfig> {
        let defaults = MotionConfig::default();
        let bin_positions_mm = match self.bin_positions_mm.as_deref().map(str::trim) {
            None | Some("") => defaults.bin_positions_mm,
            Some(text) => parse_positions(text)?,
        };

        Ok(MotionConfig {
            steps_per_mm: self.steps_per_mm.unwrap_or(defaults.steps_per_mm),
            v_max_mm_s: self.v_max_mm_s.unwrap_or(defaults.v_max_mm_s),
            a_max_mm_s2: self.a_max_mm_s2.unwrap_or(defaults.a_max_mm_s2),
            bin_positions_mm,
            threshold_percent: clamp_threshold(
                self.threshold_percent.unwrap_or(defaults.threshold_percent),
            ),
        })
    }
}

fn parse_positions(text: &str) -> RepoResult<[i64; 3]> {
    let values: Vec<i64> = serde_json::from_str(text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid bin_positions_mm `{text}` in config.bin_positions_mm: {err}"
        ))
    })?;
    <[i64; 3]>::try_from(values.as_slice()).map_err(|_| {
        RepoError::InvalidData(format!(
            "bin_positions_mm `{text}` does not hold exactly 3 positions"
        ))
    })
}
