//! Claims Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    claims::{
        data::NewClaim,
        records::{ClaimRecord, ClaimSummary, ClaimUuid},
    },
    promotions::records::PromotionUuid,
    wallets::records::WalletUuid,
};

const CREATE_CLAIM_SQL: &str = include_str!("../sql/create_claim.sql");
const GET_CLAIM_SQL: &str = include_str!("../sql/get_claim.sql");
const CLAIM_SUMMARY_SQL: &str = include_str!("../sql/claim_summary.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgClaimsRepository;

impl PgClaimsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a claim row. The unique constraint on
    /// `(promotion_uuid, wallet_uuid)` rejects a second claim for the
    /// same pair.
    pub(crate) async fn create_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: NewClaim,
    ) -> Result<ClaimRecord, sqlx::Error> {
        query_as::<Postgres, ClaimRecord>(CREATE_CLAIM_SQL)
            .bind(claim.uuid.into_uuid())
            .bind(claim.promotion.into_uuid())
            .bind(claim.wallet.into_uuid())
            .bind(claim.approximate_value)
            .bind(claim.bonus)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: ClaimUuid,
    ) -> Result<Option<ClaimRecord>, sqlx::Error> {
        query_as::<Postgres, ClaimRecord>(GET_CLAIM_SQL)
            .bind(claim.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Aggregate a wallet's claims for one promotion type. `None` when
    /// the wallet has no claims of that type.
    pub(crate) async fn claim_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: WalletUuid,
        claim_type: &str,
    ) -> Result<Option<ClaimSummary>, sqlx::Error> {
        query_as::<Postgres, ClaimSummary>(CLAIM_SUMMARY_SQL)
            .bind(wallet.into_uuid())
            .bind(claim_type)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ClaimRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ClaimUuid::from_uuid(row.try_get("uuid")?),
            promotion_uuid: PromotionUuid::from_uuid(row.try_get("promotion_uuid")?),
            wallet_uuid: WalletUuid::from_uuid(row.try_get("wallet_uuid")?),
            approximate_value: row.try_get("approximate_value")?,
            bonus: row.try_get("bonus")?,
            redeemed: row.try_get("redeemed")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ClaimSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            earnings: row.try_get("earnings")?,
            last_claim: row.try_get::<SqlxTimestamp, _>("last_claim")?.to_jiff(),
            claim_type: row.try_get("claim_type")?,
        })
    }
}
