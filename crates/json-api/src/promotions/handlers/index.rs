//! Promotion Index Handler

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rewards_app::domain::{
    promotions::records::AvailablePromotion, wallets::records::WalletUuid,
};

use crate::{extensions::*, state::State, validation::ValidationErrorResponse};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromotionsResponse {
    /// Promotions the wallet can see, claimable or not.
    pub promotions: Vec<PromotionView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromotionView {
    /// The promotion UUID
    pub id: Uuid,

    /// Promotion type, e.g. `ugp` or `ads`
    #[serde(rename = "type")]
    pub promotion_type: String,

    /// Grant protocol version
    pub version: i32,

    /// Number of suggestions one grant funds
    pub suggestions_per_grant: i32,

    /// Total grant value in BAT
    pub approximate_value: Decimal,

    /// Whether this wallet can claim the promotion right now
    pub available: bool,

    /// When the promotion was created
    #[salvo(schema(value_type = String, format = DateTime))]
    pub created_at: Timestamp,

    /// When the promotion stops accepting claims
    #[salvo(schema(value_type = String, format = DateTime))]
    pub expires_at: Timestamp,
}

impl From<AvailablePromotion> for PromotionView {
    fn from(listed: AvailablePromotion) -> Self {
        let promotion = listed.promotion;

        PromotionView {
            id: promotion.uuid.into_uuid(),
            promotion_type: promotion.promotion_type,
            version: promotion.version,
            suggestions_per_grant: promotion.suggestions_per_grant,
            approximate_value: promotion.approximate_value,
            available: listed.available,
            created_at: promotion.created_at,
            expires_at: promotion.expires_at,
        }
    }
}

/// Promotion Index Handler
///
/// Returns the non-expired promotions with per-wallet availability.
#[endpoint(
    tags("promotions"),
    summary = "List Promotions",
    responses(
        (status_code = StatusCode::OK, description = "Promotions listed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let payment_id = req
        .query::<String>("paymentId")
        .and_then(|raw| Uuid::parse_str(&raw).ok());

    let Some(payment_id) = payment_id else {
        ValidationErrorResponse::new(
            "Error validating query parameter",
            "paymentId",
            "must be a uuidv4",
        )
        .render(res);

        return Ok(());
    };

    let promotions = state
        .app
        .promotions
        .list_promotions(WalletUuid::from_uuid(payment_id))
        .await
        .or_500("failed to list promotions")?;

    res.render(Json(PromotionsResponse {
        promotions: promotions.into_iter().map(Into::into).collect(),
    }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use rewards_app::domain::promotions::{
        MockPromotionsService,
        records::{PromotionRecord, PromotionUuid},
    };

    use crate::test_helpers::promotions_service;

    use super::*;

    fn make_promotion(uuid: PromotionUuid, active: bool) -> PromotionRecord {
        PromotionRecord {
            uuid,
            promotion_type: "ugp".to_string(),
            version: 5,
            suggestions_per_grant: 2,
            approximate_value: Decimal::from(30),
            active,
            created_at: Timestamp::UNIX_EPOCH,
            expires_at: Timestamp::MAX,
        }
    }

    fn make_service(promotions: MockPromotionsService) -> Service {
        promotions_service(promotions, Router::with_path("promotions").get(handler))
    }

    #[tokio::test]
    async fn test_index_returns_availability_per_wallet() -> TestResult {
        let wallet = Uuid::now_v7();
        let uuid = PromotionUuid::new();

        let mut mock = MockPromotionsService::new();

        mock.expect_list_promotions()
            .once()
            .withf(move |w| w.into_uuid() == wallet)
            .return_once(move |_| {
                Ok(vec![AvailablePromotion {
                    promotion: make_promotion(uuid, true),
                    available: true,
                }])
            });
        mock.expect_create_promotion().never();
        mock.expect_activate_promotion().never();

        let response: PromotionsResponse =
            TestClient::get(format!("http://example.com/promotions?paymentId={wallet}"))
                .send(&make_service(mock))
                .await
                .take_json()
                .await?;

        assert_eq!(response.promotions.len(), 1);
        assert_eq!(response.promotions[0].id, uuid.into_uuid());
        assert!(response.promotions[0].available);
        assert_eq!(response.promotions[0].version, 5);
        assert_eq!(response.promotions[0].approximate_value, Decimal::from(30));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_serializes_value_as_string() -> TestResult {
        let wallet = Uuid::now_v7();
        let uuid = PromotionUuid::new();

        let mut mock = MockPromotionsService::new();

        mock.expect_list_promotions().once().return_once(move |_| {
            Ok(vec![AvailablePromotion {
                promotion: make_promotion(uuid, false),
                available: false,
            }])
        });
        mock.expect_create_promotion().never();
        mock.expect_activate_promotion().never();

        let body = TestClient::get(format!("http://example.com/promotions?paymentId={wallet}"))
            .send(&make_service(mock))
            .await
            .take_string()
            .await?;

        assert!(
            body.contains(r#""approximateValue":"30""#),
            "expected decimal-string value, got {body}"
        );
        assert!(
            body.contains(r#""available":false"#),
            "inactive promotion should be listed as unavailable, got {body}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_index_without_payment_id_returns_400() -> TestResult {
        let mut mock = MockPromotionsService::new();

        mock.expect_list_promotions().never();
        mock.expect_create_promotion().never();
        mock.expect_activate_promotion().never();

        let mut res = TestClient::get("http://example.com/promotions")
            .send(&make_service(mock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        let body: ValidationErrorResponse = res.take_json().await?;

        assert_eq!(
            body.data.validation_errors.get("paymentId").map(String::as_str),
            Some("must be a uuidv4")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_index_with_malformed_payment_id_returns_400() -> TestResult {
        let mut mock = MockPromotionsService::new();

        mock.expect_list_promotions().never();
        mock.expect_create_promotion().never();
        mock.expect_activate_promotion().never();

        let res = TestClient::get("http://example.com/promotions?paymentId=not-a-uuid")
            .send(&make_service(mock))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
