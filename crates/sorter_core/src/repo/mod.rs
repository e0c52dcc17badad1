//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the ledger, the bin
//!   reference table and the config row.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The `deposits` table is append-only; no repository updates or deletes rows.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::config::ConfigValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod bin_repo;
pub mod config_repo;
pub mod ledger_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for ledger/bin/config persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ConfigValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ConfigValidationError> for RepoError {
    fn from(value: ConfigValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
