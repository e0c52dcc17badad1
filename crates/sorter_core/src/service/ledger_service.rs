//! Deposit recording use-case service.
//!
//! # Responsibility
//! - Validate controller reports into ledger events and append them.
//! - Serve the recent-events feed.

use crate::model::deposit::{DepositEvent, DepositReport, DepositValidationError};
use crate::repo::ledger_repo::LedgerRepository;
use crate::repo::{RepoError, RepoResult};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for deposit recording.
#[derive(Debug)]
pub enum LedgerServiceError {
    /// Report rejected before touching the ledger.
    Validation(DepositValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for LedgerServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LedgerServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DepositValidationError> for LedgerServiceError {
    fn from(value: DepositValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for LedgerServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Ledger facade over repository implementations.
pub struct LedgerService<L: LedgerRepository> {
    ledger: L,
}

impl<L: LedgerRepository> LedgerService<L> {
    pub fn new(ledger: L) -> Self {
        Self { ledger }
    }

    /// Validates `report`, appends it and returns the stored event.
    ///
    /// `now` stamps reports that carry no timestamp.
    pub fn record(
        &self,
        report: DepositReport,
        now: &str,
    ) -> Result<DepositEvent, LedgerServiceError> {
        let event = report.into_event(now)?;
        let sequence = self.ledger.append(&event)?;
        debug!(
            "event=deposit_append module=service status=ok sequence={} bin={} delta_g={}",
            sequence, event.bin, event.delta_g
        );
        Ok(event)
    }

    /// Most recent events, oldest first. `0` selects the default limit.
    pub fn recent(&self, limit: u32) -> RepoResult<Vec<DepositEvent>> {
        self.ledger.recent(limit)
    }
}
