//! Claim Summary Handler

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{oapi::extract::PathParam, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rewards_app::domain::wallets::records::WalletUuid;

use crate::{
    extensions::*, promotions::errors::into_status_error, state::State,
    validation::ValidationErrorResponse,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryResponse {
    /// Sum of the wallet's grant values for this claim type
    pub earnings: Decimal,

    /// When the wallet's most recent claim of this type was registered
    #[salvo(schema(value_type = String, format = DateTime))]
    pub last_claim: Timestamp,

    /// The claim type the summary covers
    #[serde(rename = "type")]
    pub claim_type: String,
}

/// Claim Summary Handler
///
/// Totals a wallet's claimed grants for one claim type. 204 when the
/// wallet has no claims of that type.
#[endpoint(
    tags("promotions"),
    summary = "Claim Summary",
    responses(
        (status_code = StatusCode::OK, description = "Summary returned"),
        (status_code = StatusCode::NO_CONTENT, description = "No matching claims"),
        (status_code = StatusCode::BAD_REQUEST, description = "Malformed paymentID"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    claim_type: PathParam<String>,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    // This endpoint spells the wallet parameter `paymentID`, unlike the
    // listing endpoint's `paymentId`.
    let payment_id = req
        .query::<String>("paymentID")
        .and_then(|raw| Uuid::parse_str(&raw).ok());

    let Some(payment_id) = payment_id else {
        ValidationErrorResponse::new(
            "Error validating query parameter",
            "paymentID",
            "must be a uuidv4",
        )
        .render(res);

        return Ok(());
    };

    let summary = state
        .app
        .claims
        .summarize_claims(WalletUuid::from_uuid(payment_id), claim_type.into_inner())
        .await
        .map_err(into_status_error)?;

    match summary {
        Some(summary) => res.render(Json(SummaryResponse {
            earnings: summary.earnings,
            last_claim: summary.last_claim,
            claim_type: summary.claim_type,
        })),
        None => {
            res.status_code(StatusCode::NO_CONTENT);
        }
    }

    Ok(())
}
