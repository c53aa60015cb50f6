//! Service error types.
//!
//! `StoreError` is what service callers see: domain errors from
//! playverse-core and storage errors from playverse-db, both wrapped
//! transparently so messages read as the underlying error.

use playverse_core::CoreError;
use playverse_db::DbError;
use thiserror::Error;

/// Errors returned by the service layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Business rule violation (not found, already rented, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database operation failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
