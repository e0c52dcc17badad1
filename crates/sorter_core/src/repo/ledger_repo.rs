//! Deposit ledger contract and SQLite implementation.
//!
//! # Responsibility
//! - Append controller deposit events in arrival order.
//! - Answer the per-bin and per-bin-per-day sums the aggregators need.
//!
//! # Invariants
//! - Rows are only ever inserted; `id` order is the ledger order.
//! - Day boundaries are UTC calendar days taken from the `ts` text prefix.

use crate::model::bin::BinId;
use crate::model::deposit::DepositEvent;
use crate::model::time::day_label;
use crate::repo::{RepoError, RepoResult};
use chrono::{Days, NaiveDate};
use rusqlite::{params, Connection, Row};

pub const RECENT_DEFAULT_LIMIT: u32 = 20;
pub const RECENT_LIMIT_MAX: u32 = 500;

/// Gram total for one bin on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBinTotal {
    /// `YYYY-MM-DD`.
    pub day: String,
    pub bin: BinId,
    pub grams: i64,
}

/// Repository interface for the append-only deposit ledger.
pub trait LedgerRepository {
    /// Appends one event and returns its ledger sequence number.
    fn append(&self, event: &DepositEvent) -> RepoResult<i64>;
    /// All-time sum of `delta_g` for `bin`; 0 when the bin has no events.
    fn sum_by_bin(&self, bin: BinId) -> RepoResult<i64>;
    /// Sum of `delta_g` for `bin` on one UTC calendar day.
    fn sum_by_bin_and_day(&self, bin: BinId, day: NaiveDate) -> RepoResult<i64>;
    /// Per-day, per-bin totals for days in `[first_day, last_day]`.
    ///
    /// Only non-empty (day, bin) groups are returned, ordered by day then bin.
    fn daily_totals(&self, first_day: NaiveDate, last_day: NaiveDate)
        -> RepoResult<Vec<DailyBinTotal>>;
    /// The `limit` most recent events, oldest first.
    fn recent(&self, limit: u32) -> RepoResult<Vec<DepositEvent>>;
}

/// SQLite-backed ledger repository.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn append(&self, event: &DepositEvent) -> RepoResult<i64> {
        self.conn.execute(
            "INSERT INTO deposits (ts, bin, material, delta_g, fill_percent)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                event.ts.as_str(),
                event.bin,
                event.material.as_str(),
                event.delta_g,
                event.fill_percent,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn sum_by_bin(&self, bin: BinId) -> RepoResult<i64> {
        let grams = self.conn.query_row(
            "SELECT COALESCE(SUM(delta_g), 0) FROM deposits WHERE bin = ?1;",
            [bin],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(grams)
    }

    fn sum_by_bin_and_day(&self, bin: BinId, day: NaiveDate) -> RepoResult<i64> {
        let (lower, upper) = day_bounds(day, day)?;
        let grams = self.conn.query_row(
            "SELECT COALESCE(SUM(delta_g), 0)
             FROM deposits
             WHERE bin = ?1 AND ts >= ?2 AND ts < ?3;",
            params![bin, lower, upper],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(grams)
    }

    fn daily_totals(
        &self,
        first_day: NaiveDate,
        last_day: NaiveDate,
    ) -> RepoResult<Vec<DailyBinTotal>> {
        let (lower, upper) = day_bounds(first_day, last_day)?;
        let mut stmt = self.conn.prepare(
            "SELECT substr(ts, 1, 10) AS day, bin, COALESCE(SUM(delta_g), 0) AS grams
             FROM deposits
             WHERE ts >= ?1 AND ts < ?2
             GROUP BY day, bin
             ORDER BY day ASC, bin ASC;",
        )?;
        let mut rows = stmt.query(params![lower, upper])?;
        let mut totals = Vec::new();

        while let Some(row) = rows.next()? {
            totals.push(DailyBinTotal {
                day: row.get("day")?,
                bin: row.get("bin")?,
                grams: row.get("grams")?,
            });
        }

        Ok(totals)
    }

    fn recent(&self, limit: u32) -> RepoResult<Vec<DepositEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT ts, bin, material, delta_g, fill_percent
             FROM deposits
             ORDER BY id DESC
             LIMIT ?1;",
        )?;
        let mut rows = stmt.query([i64::from(normalize_recent_limit(limit))])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            events.push(parse_deposit_row(row)?);
        }

        events.reverse();
        Ok(events)
    }
}

/// Applies the default for `0` and caps oversized limits.
pub fn normalize_recent_limit(limit: u32) -> u32 {
    match limit {
        0 => RECENT_DEFAULT_LIMIT,
        value if value > RECENT_LIMIT_MAX => RECENT_LIMIT_MAX,
        value => value,
    }
}

/// Text bounds `[first_day, last_day + 1)` comparable against `ts`.
fn day_bounds(first_day: NaiveDate, last_day: NaiveDate) -> RepoResult<(String, String)> {
    let after_last = last_day.checked_add_days(Days::new(1)).ok_or_else(|| {
        RepoError::InvalidData(format!("day {last_day} is out of calendar range"))
    })?;
    Ok((day_label(first_day), day_label(after_last)))
}

fn parse_deposit_row(row: &Row<'_>) -> RepoResult<DepositEvent> {
    Ok(DepositEvent {
        ts: row.get("ts")?,
        bin: row.get("bin")?,
        material: row.get("material")?,
        delta_g: row.get("delta_g")?,
        fill_percent: row.get("fill_percent")?,
    })
}
