//! Promotions Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    promotions::{
        data::NewPromotion,
        records::{AvailablePromotion, PromotionRecord, PromotionUuid},
    },
    wallets::records::WalletUuid,
};

const CREATE_PROMOTION_SQL: &str = include_str!("../sql/create_promotion.sql");
const CREATE_PROMOTION_WITH_EXPIRY_SQL: &str =
    include_str!("../sql/create_promotion_with_expiry.sql");
const ACTIVATE_PROMOTION_SQL: &str = include_str!("../sql/activate_promotion.sql");
const GET_PROMOTION_SQL: &str = include_str!("../sql/get_promotion.sql");
const LIST_PROMOTIONS_SQL: &str = include_str!("../sql/list_promotions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromotionsRepository;

impl PgPromotionsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: NewPromotion,
    ) -> Result<PromotionRecord, sqlx::Error> {
        match promotion.expires_at {
            Some(expires_at) => {
                query_as::<Postgres, PromotionRecord>(CREATE_PROMOTION_WITH_EXPIRY_SQL)
                    .bind(promotion.uuid.into_uuid())
                    .bind(&promotion.promotion_type)
                    .bind(promotion.suggestions_per_grant)
                    .bind(promotion.approximate_value)
                    .bind(SqlxTimestamp::from(expires_at))
                    .fetch_one(&mut **tx)
                    .await
            }
            None => {
                query_as::<Postgres, PromotionRecord>(CREATE_PROMOTION_SQL)
                    .bind(promotion.uuid.into_uuid())
                    .bind(&promotion.promotion_type)
                    .bind(promotion.suggestions_per_grant)
                    .bind(promotion.approximate_value)
                    .fetch_one(&mut **tx)
                    .await
            }
        }
    }

    pub(crate) async fn activate_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ACTIVATE_PROMOTION_SQL)
            .bind(promotion.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn get_promotion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<Option<PromotionRecord>, sqlx::Error> {
        query_as::<Postgres, PromotionRecord>(GET_PROMOTION_SQL)
            .bind(promotion.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Non-expired promotions with per-wallet availability.
    pub(crate) async fn list_promotions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: WalletUuid,
        now: Timestamp,
    ) -> Result<Vec<AvailablePromotion>, sqlx::Error> {
        query_as::<Postgres, AvailablePromotion>(LIST_PROMOTIONS_SQL)
            .bind(wallet.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PromotionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PromotionUuid::from_uuid(row.try_get("uuid")?),
            promotion_type: row.try_get("promotion_type")?,
            version: row.try_get("version")?,
            suggestions_per_grant: row.try_get("suggestions_per_grant")?,
            approximate_value: row.try_get("approximate_value")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AvailablePromotion {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            promotion: PromotionRecord::from_row(row)?,
            available: row.try_get("available")?,
        })
    }
}
