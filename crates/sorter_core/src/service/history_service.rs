//! Daily deposit history aggregation.
//!
//! # Invariants
//! - The series always has exactly `days` entries, oldest first, ending on
//!   the supplied "today".
//! - Days and bins without events report 0; an empty ledger yields an
//!   all-zero structure, never an error.
//! - `total[i]` is the sum over bins of `bins[bin][i]`, saturating at the
//!   `i64` bounds.

use crate::model::bin::CANONICAL_BIN_IDS;
use crate::model::time::day_label;
use crate::repo::ledger_repo::LedgerRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const HISTORY_DEFAULT_DAYS: u32 = 7;
pub const HISTORY_MAX_DAYS: u32 = 366;

/// Fixed-width per-day gram series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositHistory {
    /// `YYYY-MM-DD`, ascending.
    pub labels: Vec<String>,
    /// Keyed by bin id as text (`"1"`, `"2"`, `"3"`).
    #[serde(rename = "bins")]
    pub per_bin: BTreeMap<String, Vec<i64>>,
    pub total: Vec<i64>,
}

/// Buckets ledger events by UTC day and bin.
pub struct HistoryService<L: LedgerRepository> {
    ledger: L,
}

impl<L: LedgerRepository> HistoryService<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Builds the series for `[today - (days - 1), today]`.
    ///
    /// `days` is normalized with [`normalize_history_days`].
    pub fn compute_history(&self, days: u32, today: NaiveDate) -> RepoResult<DepositHistory> {
        let days = normalize_history_days(days);
        let first_day = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .ok_or_else(|| {
                RepoError::InvalidData(format!("history window before {today} is out of range"))
            })?;

        let labels = first_day
            .iter_days()
            .take(days as usize)
            .map(day_label)
            .collect::<Vec<_>>();
        let index = labels
            .iter()
            .enumerate()
            .map(|(position, label)| (label.as_str(), position))
            .collect::<HashMap<_, _>>();

        let mut per_bin = CANONICAL_BIN_IDS
            .iter()
            .map(|id| (id.to_string(), vec![0_i64; labels.len()]))
            .collect::<BTreeMap<_, _>>();

        for daily in self.ledger.daily_totals(first_day, today)? {
            let Some(&position) = index.get(daily.day.as_str()) else {
                continue;
            };
            if let Some(series) = per_bin.get_mut(&daily.bin.to_string()) {
                series[position] = daily.grams;
            }
        }

        let total = (0..labels.len())
            .map(|position| {
                per_bin
                    .values()
                    .fold(0_i64, |total, series| total.saturating_add(series[position]))
            })
            .collect();

        Ok(DepositHistory {
            labels,
            per_bin,
            total,
        })
    }
}

/// Applies the default for `0` and caps oversized windows. Callers that
/// must honour the requested width reject values above `HISTORY_MAX_DAYS`
/// first.
pub fn normalize_history_days(days: u32) -> u32 {
    match days {
        0 => HISTORY_DEFAULT_DAYS,
        value if value > HISTORY_MAX_DAYS => HISTORY_MAX_DAYS,
        value => value,
    }
}
