//! Bin fill aggregation.
//!
//! # Invariants
//! - Views are ordered by bin id and cover exactly the canonical bins.
//! - Fill is all-time cumulative; no time window applies.
//! - Pure read: nothing is written.

use crate::model::bin::BinView;
use crate::repo::bin_repo::BinRepository;
use crate::repo::ledger_repo::LedgerRepository;
use crate::repo::RepoResult;

/// Derives live bin fill from the deposit ledger.
pub struct BinService<B: BinRepository, L: LedgerRepository> {
    bins: B,
    ledger: L,
}

impl<B: BinRepository, L: LedgerRepository> BinService<B, L> {
    pub fn new(bins: B, ledger: L) -> Self {
        Self { bins, ledger }
    }

    /// Computes `{id, name, grams, percent, capacity_kg}` for every bin.
    pub fn compute_bin_views(&self) -> RepoResult<Vec<BinView>> {
        self.bins
            .list_bins()?
            .iter()
            .map(|bin| {
                let grams = self.ledger.sum_by_bin(bin.id)?;
                Ok(BinView::from_bin(bin, grams))
            })
            .collect()
    }

    /// Bin capacities in id order, for the config view.
    pub fn capacities_kg(&self) -> RepoResult<Vec<f64>> {
        Ok(self
            .bins
            .list_bins()?
            .into_iter()
            .map(|bin| bin.capacity_kg)
            .collect())
    }
}
