//! Issuers Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::promotions::records::{IssuerRecord, IssuerUuid, PromotionUuid};

const CREATE_ISSUER_SQL: &str = include_str!("../sql/create_issuer.sql");
const GET_ISSUER_SQL: &str = include_str!("../sql/get_issuer.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgIssuersRepository;

impl PgIssuersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Bind an issuer to the promotion if one is not already bound.
    pub(crate) async fn ensure_issuer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
        cohort: &str,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_ISSUER_SQL)
            .bind(IssuerUuid::new().into_uuid())
            .bind(promotion.into_uuid())
            .bind(cohort)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_issuer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promotion: PromotionUuid,
    ) -> Result<Option<IssuerRecord>, sqlx::Error> {
        query_as::<Postgres, IssuerRecord>(GET_ISSUER_SQL)
            .bind(promotion.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for IssuerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: IssuerUuid::from_uuid(row.try_get("uuid")?),
            promotion_uuid: PromotionUuid::from_uuid(row.try_get("promotion_uuid")?),
            cohort: row.try_get("cohort")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
