//! Claim Errors

use salvo::http::StatusError;
use tracing::error;

use rewards_app::domain::claims::ClaimsServiceError;

pub(crate) fn into_status_error(error: ClaimsServiceError) -> StatusError {
    match error {
        ClaimsServiceError::PromotionNotFound => {
            StatusError::not_found().brief("Promotion not found")
        }
        ClaimsServiceError::NotClaimable => {
            StatusError::bad_request().brief("Promotion is not active or has expired")
        }
        ClaimsServiceError::WalletNotFound => StatusError::not_found().brief("Wallet not found"),
        ClaimsServiceError::AlreadyClaimed => {
            StatusError::conflict().brief("Promotion has already been claimed by this wallet")
        }
        ClaimsServiceError::NotFound => StatusError::not_found().brief("Claim not found"),
        ClaimsServiceError::InvalidData => StatusError::bad_request().brief("Invalid claim payload"),
        ClaimsServiceError::Ledger(source) => {
            error!("wallet lookup failed: {source}");

            StatusError::internal_server_error()
        }
        ClaimsServiceError::Sql(source) => {
            error!("claim storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
