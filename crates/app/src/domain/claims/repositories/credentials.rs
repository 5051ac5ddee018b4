//! Claim Credentials Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json,
};

use crate::{
    domain::claims::records::{ClaimUuid, CredentialRecord},
    signer::SignedCredentials,
};

const CREATE_CLAIM_CREDENTIALS_SQL: &str = include_str!("../sql/create_claim_credentials.sql");
const GET_CLAIM_CREDENTIALS_SQL: &str = include_str!("../sql/get_claim_credentials.sql");
const ATTACH_SIGNED_CREDENTIALS_SQL: &str = include_str!("../sql/attach_signed_credentials.sql");
const MARK_ISSUANCE_FAILED_SQL: &str = include_str!("../sql/mark_issuance_failed.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCredentialsRepository;

impl PgCredentialsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_credentials(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: ClaimUuid,
        blinded_creds: &[String],
    ) -> Result<(), sqlx::Error> {
        query(CREATE_CLAIM_CREDENTIALS_SQL)
            .bind(claim.into_uuid())
            .bind(Json(blinded_creds))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_credentials(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: ClaimUuid,
    ) -> Result<Option<CredentialRecord>, sqlx::Error> {
        query_as::<Postgres, CredentialRecord>(GET_CLAIM_CREDENTIALS_SQL)
            .bind(claim.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Attach signed credentials to a still-pending claim.
    ///
    /// Returns the number of rows updated; zero means another worker
    /// already settled this claim and the result should be discarded.
    pub(crate) async fn attach_signed_credentials(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: ClaimUuid,
        signed: &SignedCredentials,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(ATTACH_SIGNED_CREDENTIALS_SQL)
            .bind(claim.into_uuid())
            .bind(Json(&signed.signed_creds))
            .bind(&signed.batch_proof)
            .bind(&signed.public_key)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Mark issuance as terminally failed for a still-pending claim.
    pub(crate) async fn mark_issuance_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: ClaimUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_ISSUANCE_FAILED_SQL)
            .bind(claim.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for CredentialRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            claim_uuid: ClaimUuid::from_uuid(row.try_get("claim_uuid")?),
            blinded_creds: row.try_get::<Json<Vec<String>>, _>("blinded_creds")?.0,
            signed_creds: row
                .try_get::<Option<Json<Vec<String>>>, _>("signed_creds")?
                .map(|creds| creds.0),
            batch_proof: row.try_get("batch_proof")?,
            public_key: row.try_get("public_key")?,
            failed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("failed_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
