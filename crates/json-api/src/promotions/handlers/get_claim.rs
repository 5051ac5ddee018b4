//! Get Claim Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use rewards_app::domain::{
    claims::records::{ClaimStatus, ClaimUuid},
    promotions::records::PromotionUuid,
};

use crate::{extensions::*, promotions::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClaimCredentialsResponse {
    /// Signed tokens, one per blinded token submitted at registration
    pub signed_creds: Vec<String>,

    /// Batch DLEQ proof over the signed tokens
    pub batch_proof: String,

    /// Issuer public key the proof verifies against
    pub public_key: String,
}

/// Get Claim Handler
///
/// Point-read of a claim's issuance state. Returns the signed
/// credentials once issuance completes; 202 while it is still in
/// flight; 410 when issuance ended without credentials.
#[endpoint(
    tags("promotions"),
    summary = "Get Claim",
    responses(
        (status_code = StatusCode::OK, description = "Signed credentials ready"),
        (status_code = StatusCode::ACCEPTED, description = "Issuance still pending"),
        (status_code = StatusCode::GONE, description = "Issuance failed"),
        (status_code = StatusCode::NOT_FOUND, description = "Claim not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    claim: PathParam<Uuid>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let promotion = PromotionUuid::from_uuid(promotion.into_inner());
    let claim = ClaimUuid::from_uuid(claim.into_inner());

    debug!(promotion_uuid = %promotion, claim_uuid = %claim, "claim status requested");

    let status = state
        .app
        .claims
        .get_claim(promotion, claim)
        .await
        .map_err(into_status_error)?;

    match status {
        ClaimStatus::Completed(signed) => {
            res.render(Json(ClaimCredentialsResponse {
                signed_creds: signed.signed_creds,
                batch_proof: signed.batch_proof,
                public_key: signed.public_key,
            }));
        }
        ClaimStatus::Pending => {
            res.status_code(StatusCode::ACCEPTED);
        }
        ClaimStatus::Failed => {
            return Err(StatusError::gone().brief("Credential issuance failed"));
        }
    }

    Ok(())
}
