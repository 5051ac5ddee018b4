//! Wallets Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    domain::wallets::records::{WalletRecord, WalletUuid},
    ledger::WalletInfo,
};

const UPSERT_WALLET_SQL: &str = include_str!("sql/upsert_wallet.sql");
const GET_WALLET_SQL: &str = include_str!("sql/get_wallet.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWalletsRepository;

impl PgWalletsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn upsert_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: &WalletInfo,
    ) -> Result<(), sqlx::Error> {
        query(UPSERT_WALLET_SQL)
            .bind(wallet.payment_id)
            .bind(&wallet.provider)
            .bind(&wallet.provider_id)
            .bind(&wallet.public_key)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: WalletUuid,
    ) -> Result<Option<WalletRecord>, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(GET_WALLET_SQL)
            .bind(wallet.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for WalletRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: WalletUuid::from_uuid(row.try_get("uuid")?),
            provider: row.try_get("provider")?,
            provider_id: row.try_get("provider_id")?,
            public_key: row.try_get("public_key")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{database::Db, test::TestDb};

    use super::*;

    fn wallet_info(payment_id: Uuid, provider_id: &str) -> WalletInfo {
        WalletInfo {
            payment_id,
            provider: "uphold".to_string(),
            provider_id: provider_id.to_string(),
            public_key: format!("pk:{provider_id}"),
        }
    }

    #[tokio::test]
    async fn upsert_wallet_refreshes_identity_fields() -> TestResult {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());
        let repository = PgWalletsRepository::new();
        let payment_id = Uuid::now_v7();

        let mut tx = db.begin().await?;

        repository
            .upsert_wallet(&mut tx, &wallet_info(payment_id, "card-one"))
            .await?;
        repository
            .upsert_wallet(&mut tx, &wallet_info(payment_id, "card-two"))
            .await?;

        let wallet = repository
            .get_wallet(&mut tx, WalletUuid::from_uuid(payment_id))
            .await?
            .expect("wallet after upsert");

        tx.commit().await?;

        assert_eq!(wallet.uuid.into_uuid(), payment_id);
        assert_eq!(wallet.provider, "uphold");
        assert_eq!(wallet.provider_id, "card-two");
        assert_eq!(wallet.public_key, "pk:card-two");

        Ok(())
    }

    #[tokio::test]
    async fn get_wallet_unknown_uuid_returns_none() -> TestResult {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let mut tx = db.begin().await?;

        let wallet = PgWalletsRepository::new()
            .get_wallet(&mut tx, WalletUuid::new())
            .await?;

        tx.commit().await?;

        assert!(wallet.is_none(), "no wallet row was inserted");

        Ok(())
    }
}
