use thiserror::Error;

use crate::error::HttpError;
use axum::http::StatusCode;

/// Every failure the ledger core reports. Storage errors are classified into
/// one of these before they leave the `db` layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Storage temporarily unavailable: {0}")]
    Transient(String),

    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Only transient failures are worth retrying; the core never retries on
    /// its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Transient(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::Invalid(_) => "invalid",
            LedgerError::Transient(_) => "unavailable",
            LedgerError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Conflict(_) => StatusCode::CONFLICT,
            LedgerError::Invalid(_) => StatusCode::BAD_REQUEST,
            LedgerError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => LedgerError::NotFound("record not found".to_string()),

            sqlx::Error::Database(ref db_err) => {
                if db_err.is_unique_violation() {
                    LedgerError::Conflict(db_err.message().to_string())
                } else if db_err.is_foreign_key_violation() {
                    LedgerError::NotFound(format!(
                        "referenced record does not exist: {}",
                        db_err.message()
                    ))
                } else if db_err.is_check_violation() {
                    LedgerError::Invalid(db_err.message().to_string())
                } else if db_err.code().is_some_and(|code| is_transient_sqlstate(&code)) {
                    LedgerError::Transient(error.to_string())
                } else {
                    LedgerError::Internal(error.to_string())
                }
            }

            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => LedgerError::Transient(error.to_string()),

            _ => LedgerError::Internal(error.to_string()),
        }
    }
}

/// SQLSTATEs that mean the server is going away, overloaded, or aborted the
/// statement in a way a retry can get past.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("53")
        || code.starts_with("57P0")
        || matches!(code, "57014" | "40001" | "40P01")
}

impl From<LedgerError> for HttpError {
    fn from(error: LedgerError) -> Self {
        // Internal details stay in the logs.
        let message = match &error {
            LedgerError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        if let LedgerError::Internal(detail) = &error {
            tracing::error!("internal ledger error: {}", detail);
        }
        HttpError::new(message, error.status_code()).with_code(error.code())
    }
}
