use thiserror::Error;

use crate::repository::RepositoryError;

/// Message returned to callers for failures whose details must stay internal.
pub const UNEXPECTED_ERROR: &str = "Unexpected error, check server logs";

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing error categories produced by the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The looked up product does not exist.
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness constraint was violated; carries the constraint detail.
    #[error("{0}")]
    Conflict(String),
    /// The submitted payload failed validation.
    #[error("{0}")]
    Form(String),
    /// Any other failure. The cause has already been logged.
    #[error("Unexpected error, check server logs")]
    Internal,
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound("Product not found".to_string()),
            RepositoryError::ConstraintViolation(detail) => ServiceError::Conflict(detail),
            other => {
                log::error!("{other}");
                ServiceError::Internal
            }
        }
    }
}
