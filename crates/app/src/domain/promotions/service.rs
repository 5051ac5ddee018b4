//! Promotions Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        promotions::{
            PromotionsServiceError,
            data::NewPromotion,
            records::{AvailablePromotion, PromotionRecord, PromotionUuid},
            repositories::{issuers::PgIssuersRepository, promotions::PgPromotionsRepository},
        },
        wallets::records::WalletUuid,
    },
};

/// Cohort new issuers are bound under.
const DEFAULT_COHORT: &str = "control";

#[derive(Debug, Clone)]
pub struct PgPromotionsService {
    db: Db,
    promotions: PgPromotionsRepository,
    issuers: PgIssuersRepository,
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            promotions: PgPromotionsRepository::new(),
            issuers: PgIssuersRepository::new(),
        }
    }
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, promotion),
        fields(
            promotion_uuid = %promotion.uuid,
            promotion_type = %promotion.promotion_type,
            suggestions_per_grant = promotion.suggestions_per_grant,
        ),
        err
    )]
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.promotions.create_promotion(&mut tx, promotion).await?;

        tx.commit().await?;

        info!(promotion_uuid = %record.uuid, "created promotion");

        Ok(record)
    }

    #[tracing::instrument(
        name = "promotions.service.activate_promotion",
        skip(self),
        fields(promotion_uuid = %uuid),
        err
    )]
    async fn activate_promotion(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.promotions.activate_promotion(&mut tx, uuid).await?;

        if rows_affected == 0 {
            return Err(PromotionsServiceError::NotFound);
        }

        self.issuers
            .ensure_issuer(&mut tx, uuid, DEFAULT_COHORT)
            .await?;

        tx.commit().await?;

        info!(promotion_uuid = %uuid, "activated promotion");

        Ok(())
    }

    #[tracing::instrument(
        name = "promotions.service.list_promotions",
        skip(self),
        fields(wallet_uuid = %wallet),
        err
    )]
    async fn list_promotions(
        &self,
        wallet: WalletUuid,
    ) -> Result<Vec<AvailablePromotion>, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let promotions = self
            .promotions
            .list_promotions(&mut tx, wallet, Timestamp::now())
            .await?;

        tx.commit().await?;

        Ok(promotions)
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Create an inactive promotion.
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Activate a promotion and bind its signing issuer.
    async fn activate_promotion(&self, uuid: PromotionUuid) -> Result<(), PromotionsServiceError>;

    /// Non-expired promotions with availability for the given wallet.
    async fn list_promotions(
        &self,
        wallet: WalletUuid,
    ) -> Result<Vec<AvailablePromotion>, PromotionsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::{Timestamp, ToSpan};
    use rust_decimal::Decimal;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::test::TestContext;

    use super::*;

    fn new_promotion(uuid: PromotionUuid) -> NewPromotion {
        NewPromotion {
            uuid,
            promotion_type: "ugp".to_string(),
            suggestions_per_grant: 2,
            approximate_value: Decimal::from(15),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn create_promotion_returns_inactive_record() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = PromotionUuid::new();

        let before = Timestamp::now();
        let promotion = ctx.promotions.create_promotion(new_promotion(uuid)).await?;
        let after = Timestamp::now();

        assert_eq!(promotion.uuid, uuid);
        assert_eq!(promotion.promotion_type, "ugp");
        assert_eq!(promotion.version, 5);
        assert_eq!(promotion.suggestions_per_grant, 2);
        assert_eq!(promotion.approximate_value, Decimal::from(15));
        assert!(!promotion.active);
        assert!(promotion.created_at >= before);
        assert!(promotion.created_at <= after);
        assert!(
            promotion.expires_at > promotion.created_at,
            "default expiry should be in the future"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_promotion_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = PromotionUuid::new();

        ctx.promotions.create_promotion(new_promotion(uuid)).await?;

        let result = ctx.promotions.create_promotion(new_promotion(uuid)).await;

        assert!(
            matches!(result, Err(PromotionsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_promotion_zero_suggestions_returns_invalid_data() {
        let ctx = TestContext::new().await;

        let result = ctx
            .promotions
            .create_promotion(NewPromotion {
                suggestions_per_grant: 0,
                ..new_promotion(PromotionUuid::new())
            })
            .await;

        assert!(
            matches!(result, Err(PromotionsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_promotion_zero_value_returns_invalid_data() {
        let ctx = TestContext::new().await;

        let result = ctx
            .promotions
            .create_promotion(NewPromotion {
                approximate_value: Decimal::ZERO,
                ..new_promotion(PromotionUuid::new())
            })
            .await;

        assert!(
            matches!(result, Err(PromotionsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );
    }

    #[tokio::test]
    async fn activate_promotion_sets_active_and_binds_issuer() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = PromotionUuid::new();

        ctx.promotions.create_promotion(new_promotion(uuid)).await?;
        ctx.promotions.activate_promotion(uuid).await?;

        let (active, issuer_count): (bool, i64) = sqlx::query_as(
            "SELECT p.active, COUNT(i.uuid)
             FROM promotions p
             LEFT JOIN issuers i ON i.promotion_uuid = p.uuid
             WHERE p.uuid = $1
             GROUP BY p.active",
        )
        .bind(uuid.into_uuid())
        .fetch_one(ctx.db.pool())
        .await?;

        assert!(active, "promotion should be active after activation");
        assert_eq!(issuer_count, 1, "activation should bind exactly one issuer");

        Ok(())
    }

    #[tokio::test]
    async fn activate_promotion_twice_binds_one_issuer() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = PromotionUuid::new();

        ctx.promotions.create_promotion(new_promotion(uuid)).await?;
        ctx.promotions.activate_promotion(uuid).await?;
        ctx.promotions.activate_promotion(uuid).await?;

        let issuer_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM issuers WHERE promotion_uuid = $1")
                .bind(uuid.into_uuid())
                .fetch_one(ctx.db.pool())
                .await?;

        assert_eq!(issuer_count, 1, "re-activation should not add issuers");

        Ok(())
    }

    #[tokio::test]
    async fn activate_promotion_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.promotions.activate_promotion(PromotionUuid::new()).await;

        assert!(
            matches!(result, Err(PromotionsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn list_promotions_availability_flips_on_activation() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = PromotionUuid::new();
        let wallet = WalletUuid::from_uuid(Uuid::now_v7());

        let listed = ctx.promotions.list_promotions(wallet).await?;
        assert!(listed.is_empty(), "expected no promotions before creation");

        ctx.promotions.create_promotion(new_promotion(uuid)).await?;

        let listed = ctx.promotions.list_promotions(wallet).await?;
        assert_eq!(listed.len(), 1, "expected the created promotion");
        assert!(
            !listed[0].available,
            "inactive promotion should be listed but unavailable"
        );

        ctx.promotions.activate_promotion(uuid).await?;

        let listed = ctx.promotions.list_promotions(wallet).await?;
        assert!(
            listed[0].available,
            "active unclaimed promotion should be available"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_promotions_excludes_expired() -> TestResult {
        let ctx = TestContext::new().await;
        let wallet = WalletUuid::from_uuid(Uuid::now_v7());

        ctx.promotions
            .create_promotion(NewPromotion {
                expires_at: Some(Timestamp::now() - 1.hour()),
                ..new_promotion(PromotionUuid::new())
            })
            .await?;

        let listed = ctx.promotions.list_promotions(wallet).await?;

        assert!(listed.is_empty(), "expired promotions should not be listed");

        Ok(())
    }
}
