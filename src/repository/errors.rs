use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,
    /// A uniqueness constraint (product title or slug) was violated.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
    /// Any other database failure.
    #[error("database error: {0}")]
    Database(DieselError),
    /// A stored row could not be decoded into its domain form.
    #[error("corrupted record: {0}")]
    Corrupted(String),
}

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let detail = info.details().unwrap_or_else(|| info.message());
                RepositoryError::ConstraintViolation(detail.to_string())
            }
            other => RepositoryError::Database(other),
        }
    }
}
