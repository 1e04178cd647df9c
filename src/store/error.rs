//! Store Errors
//!
//! Error types for record store operations.

use crate::domain::DomainError;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for check_violation
const CHECK_VIOLATION: &str = "23514";

/// Errors that can occur in a record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique key already exists
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The write would break a record invariant; nothing was written
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Stored data could not be turned back into a record
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// The backend refused or failed the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// Check if this error is a unique key conflict
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate(_))
    }

    /// Check if this error is an invariant rejection
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::ConstraintViolation(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => StoreError::Duplicate(err.to_string()),
            Some(CHECK_VIOLATION) => StoreError::ConstraintViolation(err.to_string()),
            _ => StoreError::Database(err),
        }
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        StoreError::ConstraintViolation(err.to_string())
    }
}
