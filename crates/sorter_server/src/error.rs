//! Request-level error type and its JSON envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde_json::json;
use sorter_core::db::DbError;
use sorter_core::{DepositValidationError, LedgerServiceError, RepoError};
use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or out-of-contract request; nothing was modified.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("event=request module=server status=error error={self}");
        } else {
            warn!("event=request module=server status=rejected error={self}");
        }

        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<DepositValidationError> for AppError {
    fn from(value: DepositValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<LedgerServiceError> for AppError {
    fn from(value: LedgerServiceError) -> Self {
        match value {
            LedgerServiceError::Validation(err) => err.into(),
            LedgerServiceError::Repo(err) => err.into(),
        }
    }
}

impl From<JoinError> for AppError {
    fn from(value: JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {value}"))
    }
}
