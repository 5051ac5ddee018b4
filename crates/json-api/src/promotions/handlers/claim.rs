//! Create Claim Handler

use std::sync::Arc;

use salvo::{oapi::extract::{JsonBody, PathParam}, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rewards_app::domain::{claims::data::ClaimRequest, promotions::records::PromotionUuid};

use crate::{extensions::*, promotions::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateClaimRequest {
    /// The claiming wallet's payment ID
    pub payment_id: Uuid,

    /// Blinded tokens to be signed, one per funded suggestion
    pub blinded_creds: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ClaimCreatedResponse {
    /// UUID of the registered claim
    #[serde(rename = "claimId")]
    pub claim_id: Uuid,
}

/// Create Claim Handler
///
/// Registers the wallet's claim on a promotion and starts credential
/// issuance in the background. The response carries the claim UUID to
/// poll; signed credentials arrive soon after.
#[endpoint(
    tags("promotions"),
    summary = "Claim Promotion",
    responses(
        (status_code = StatusCode::OK, description = "Claim registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Promotion or wallet not found"),
        (status_code = StatusCode::CONFLICT, description = "Already claimed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    promotion: PathParam<Uuid>,
    json: JsonBody<CreateClaimRequest>,
    depot: &mut Depot,
) -> Result<Json<ClaimCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let claim = state
        .app
        .claims
        .create_claim(ClaimRequest {
            promotion: PromotionUuid::from_uuid(promotion.into_inner()),
            payment_id: request.payment_id,
            blinded_creds: request.blinded_creds,
        })
        .await
        .map_err(into_status_error)?;

    Ok(Json(ClaimCreatedResponse {
        claim_id: claim.into_uuid(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use rewards_app::domain::claims::{
        ClaimsServiceError, MockClaimsService, records::ClaimUuid,
    };

    use crate::test_helpers::claims_service;

    use super::*;

    fn make_service(claims: MockClaimsService) -> Service {
        claims_service(claims, Router::with_path("promotion/{promotion}").post(handler))
    }

    fn claim_body(payment_id: Uuid) -> serde_json::Value {
        json!({
            "paymentId": payment_id,
            "blindedCreds": ["blinded-one", "blinded-two"],
        })
    }

    #[tokio::test]
    async fn test_claim_returns_claim_id() -> TestResult {
        let promotion = Uuid::now_v7();
        let payment_id = Uuid::now_v7();
        let claim = ClaimUuid::new();

        let mut mock = MockClaimsService::new();

        mock.expect_create_claim()
            .once()
            .withf(move |request| {
                request.promotion.into_uuid() == promotion
                    && request.payment_id == payment_id
                    && request.blinded_creds == ["blinded-one", "blinded-two"]
            })
            .return_once(move |_| Ok(claim));
        mock.expect_get_claim().never();
        mock.expect_summarize_claims().never();

        let response: ClaimCreatedResponse =
            TestClient::post(format!("http://example.com/promotion/{promotion}"))
                .json(&claim_body(payment_id))
                .send(&make_service(mock))
                .await
                .take_json()
                .await?;

        assert_eq!(response.claim_id, claim.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_already_claimed_returns_409() -> TestResult {
        let promotion = Uuid::now_v7();

        let mut mock = MockClaimsService::new();

        mock.expect_create_claim()
            .once()
            .return_once(|_| Err(ClaimsServiceError::AlreadyClaimed));
        mock.expect_get_claim().never();
        mock.expect_summarize_claims().never();

        let res = TestClient::post(format!("http://example.com/promotion/{promotion}"))
            .json(&claim_body(Uuid::now_v7()))
            .send(&make_service(mock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_inactive_promotion_returns_400() -> TestResult {
        let promotion = Uuid::now_v7();

        let mut mock = MockClaimsService::new();

        mock.expect_create_claim()
            .once()
            .return_once(|_| Err(ClaimsServiceError::NotClaimable));
        mock.expect_get_claim().never();
        mock.expect_summarize_claims().never();

        let res = TestClient::post(format!("http://example.com/promotion/{promotion}"))
            .json(&claim_body(Uuid::now_v7()))
            .send(&make_service(mock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_unknown_promotion_returns_404() -> TestResult {
        let promotion = Uuid::now_v7();

        let mut mock = MockClaimsService::new();

        mock.expect_create_claim()
            .once()
            .return_once(|_| Err(ClaimsServiceError::PromotionNotFound));
        mock.expect_get_claim().never();
        mock.expect_summarize_claims().never();

        let res = TestClient::post(format!("http://example.com/promotion/{promotion}"))
            .json(&claim_body(Uuid::now_v7()))
            .send(&make_service(mock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_token_count_mismatch_returns_400() -> TestResult {
        let promotion = Uuid::now_v7();

        let mut mock = MockClaimsService::new();

        mock.expect_create_claim()
            .once()
            .return_once(|_| Err(ClaimsServiceError::InvalidData));
        mock.expect_get_claim().never();
        mock.expect_summarize_claims().never();

        let res = TestClient::post(format!("http://example.com/promotion/{promotion}"))
            .json(&json!({ "paymentId": Uuid::now_v7(), "blindedCreds": ["only-one"] }))
            .send(&make_service(mock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
