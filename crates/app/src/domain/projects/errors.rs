//! Projects service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectsServiceError {
    #[error("project already exists")]
    AlreadyExists,

    #[error("project not found")]
    NotFound,

    #[error("adjustment would overspend or underflow the points ledger")]
    InvalidAdjustment,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ProjectsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::NotFound,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            // The ledger CHECK constraints are the last line of defence
            // behind the guarded updates.
            Some(ErrorKind::CheckViolation) => Self::InvalidAdjustment,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
