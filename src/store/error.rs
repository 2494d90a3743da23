//! Store Errors

use uuid::Uuid;

/// Errors that can occur in the ledger store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict on an account balance
    #[error("Concurrency conflict for account {account_id}: expected version {expected}")]
    VersionConflict { account_id: Uuid, expected: i64 },

    /// The database aborted the unit to break a lock cycle or a
    /// serialization anomaly (SQLSTATE)
    #[error("Transaction conflict: SQLSTATE {0}")]
    TransactionConflict(String),

    /// Unique constraint violation (constraint name)
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Stored row does not map onto a domain record
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// SQLSTATE codes after which re-running the whole unit can succeed
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

pub(crate) fn is_retryable_sqlstate(code: &str) -> bool {
    RETRYABLE_SQLSTATES.contains(&code)
}

impl StoreError {
    /// Check if this error is a concurrency conflict a fresh attempt may get past
    pub fn is_version_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. } | StoreError::TransactionConflict(_)
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code().filter(|code| is_retryable_sqlstate(code)) {
                return StoreError::TransactionConflict(code.into_owned());
            }
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}
