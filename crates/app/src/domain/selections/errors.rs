//! Selections service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectionsServiceError {
    #[error("caller is not authenticated")]
    Unauthorized,

    #[error("caller's role may not select products")]
    PermissionDenied,

    #[error("project balance cannot cover the selection cost")]
    InsufficientPoints,

    #[error("product is already selected for this project")]
    DuplicateSelection,

    #[error("project or selection not found")]
    NotFound,

    #[error("product not found")]
    ProductNotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for SelectionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            // The (project, product) unique index is the duplicate gate;
            // hitting it rolls the whole selection transaction back.
            Some(ErrorKind::UniqueViolation) => Self::DuplicateSelection,
            Some(ErrorKind::ForeignKeyViolation) => Self::ProductNotFound,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
