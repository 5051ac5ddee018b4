//! Claims service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum ClaimsServiceError {
    #[error("promotion not found")]
    PromotionNotFound,

    #[error("promotion is not active or has expired")]
    NotClaimable,

    #[error("wallet not found")]
    WalletNotFound,

    #[error("promotion already claimed by this wallet")]
    AlreadyClaimed,

    #[error("claim not found")]
    NotFound,

    #[error("invalid data")]
    InvalidData,

    #[error("ledger lookup failed")]
    Ledger(#[source] LedgerError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ClaimsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyClaimed,
            Some(ErrorKind::ForeignKeyViolation) => Self::PromotionNotFound,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

impl From<LedgerError> for ClaimsServiceError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::NotFound => Self::WalletNotFound,
            other => Self::Ledger(other),
        }
    }
}
