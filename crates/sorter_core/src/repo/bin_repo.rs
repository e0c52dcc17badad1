//! Bin reference table contract and SQLite implementation.
//!
//! # Responsibility
//! - List the canonical bins in id order.
//! - Restore the canonical bin set at startup.
//!
//! # Invariants
//! - `list_bins` never returns ids outside `1..=3`.
//! - Reconciliation runs in one transaction: a reader sees either the old or
//!   the repaired table, never a half-repaired one.

use crate::model::bin::{is_canonical_bin, Bin, CANONICAL_BIN_IDS};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{params, Connection};

/// Outcome of a canonical-bin reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinReconcileReport {
    /// Rows deleted because their id is not canonical.
    pub removed: usize,
    /// Canonical rows recreated with default name/capacity.
    pub inserted: usize,
}

/// Repository interface for the static bin reference rows.
pub trait BinRepository {
    /// Returns canonical bins ordered by id, filling any missing row with
    /// its default.
    fn list_bins(&self) -> RepoResult<Vec<Bin>>;
    /// Deletes non-canonical rows and recreates missing canonical ones.
    fn reconcile_canonical_bins(&self) -> RepoResult<BinReconcileReport>;
}

/// SQLite-backed bin repository.
pub struct SqliteBinRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBinRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BinRepository for SqliteBinRepository<'_> {
    fn list_bins(&self) -> RepoResult<Vec<Bin>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, capacity_kg FROM bins ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut stored = Vec::new();

        while let Some(row) = rows.next()? {
            let bin = Bin {
                id: row.get("id")?,
                name: row.get("name")?,
                capacity_kg: row.get("capacity_kg")?,
            };
            if !is_canonical_bin(bin.id) {
                continue;
            }
            if bin.capacity_kg.is_nan() || bin.capacity_kg <= 0.0 {
                return Err(RepoError::InvalidData(format!(
                    "bin {} has non-positive capacity {}",
                    bin.id, bin.capacity_kg
                )));
            }
            stored.push(bin);
        }

        Ok(CANONICAL_BIN_IDS
            .iter()
            .map(|id| {
                stored
                    .iter()
                    .find(|bin| bin.id == *id)
                    .cloned()
                    .unwrap_or_else(|| Bin::canonical_default(*id))
            })
            .collect())
    }

    fn reconcile_canonical_bins(&self) -> RepoResult<BinReconcileReport> {
        let tx = self.conn.unchecked_transaction()?;

        let removed = tx.execute(
            "DELETE FROM bins WHERE id NOT IN (?1, ?2, ?3);",
            params![
                CANONICAL_BIN_IDS[0],
                CANONICAL_BIN_IDS[1],
                CANONICAL_BIN_IDS[2]
            ],
        )?;

        let mut inserted = 0;
        for bin in Bin::canonical() {
            inserted += tx.execute(
                "INSERT OR IGNORE INTO bins (id, name, capacity_kg) VALUES (?1, ?2, ?3);",
                params![bin.id, bin.name.as_str(), bin.capacity_kg],
            )?;
        }

        tx.commit()?;

        let report = BinReconcileReport { removed, inserted };
        if report == BinReconcileReport::default() {
            info!("event=bins_reconcile module=repo status=ok changed=false");
        } else {
            warn!(
                "event=bins_reconcile module=repo status=ok changed=true removed={} inserted={}",
                report.removed, report.inserted
            );
        }
        Ok(report)
    }
}
