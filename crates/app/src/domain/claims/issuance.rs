//! Detached credential issuance.
//!
//! Registration returns as soon as the claim row is committed; a
//! spawned worker carries the blinded tokens to the signer and attaches
//! the result. Workers are idempotent: a claim that is already settled
//! is left alone, and the attach update only lands on pending rows.

use std::{sync::Arc, time::Duration};

use tracing::{error, info, warn};

use crate::{
    database::Db,
    domain::{
        claims::{
            ClaimsServiceError,
            records::{ClaimUuid, CredentialRecord},
            repositories::{claims::PgClaimsRepository, credentials::PgCredentialsRepository},
        },
        promotions::PgIssuersRepository,
    },
    metrics,
    signer::{CredentialSigner, SignedCredentials},
};

/// Retry schedule for transient signer failures.
#[derive(Debug, Clone)]
pub struct IssuancePolicy {
    /// Total attempts before the claim is marked failed.
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles per retry.
    pub initial_backoff: Duration,
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// One issuance run for one claim.
pub(crate) struct IssuanceWorker {
    db: Db,
    signer: Arc<dyn CredentialSigner>,
    policy: IssuancePolicy,
    claims: PgClaimsRepository,
    credentials: PgCredentialsRepository,
    issuers: PgIssuersRepository,
}

impl IssuanceWorker {
    pub(crate) fn new(db: Db, signer: Arc<dyn CredentialSigner>, policy: IssuancePolicy) -> Self {
        Self {
            db,
            signer,
            policy,
            claims: PgClaimsRepository::new(),
            credentials: PgCredentialsRepository::new(),
            issuers: PgIssuersRepository::new(),
        }
    }

    /// Run issuance for the claim on a detached task.
    pub(crate) fn spawn(self, claim: ClaimUuid) {
        tokio::spawn(async move {
            if let Err(source) = self.run(claim).await {
                error!(claim_uuid = %claim, "issuance run failed: {source}");
            }
        });
    }

    #[tracing::instrument(name = "claims.issuance.run", skip(self), fields(claim_uuid = %claim))]
    async fn run(&self, claim: ClaimUuid) -> Result<(), ClaimsServiceError> {
        let (credentials, signer_name) = match self.load(claim).await? {
            Some(pending) => pending,
            None => return Ok(()),
        };

        match self.sign_with_retry(&signer_name, &credentials).await {
            Some(signed) => self.attach(claim, &signed).await,
            None => self.mark_failed(claim).await,
        }
    }

    /// Load the pending credentials and the issuer name to sign under.
    /// `None` when the claim is already settled.
    async fn load(
        &self,
        claim: ClaimUuid,
    ) -> Result<Option<(CredentialRecord, String)>, ClaimsServiceError> {
        let mut tx = self.db.begin().await?;

        let credentials = self
            .credentials
            .get_credentials(&mut tx, claim)
            .await?
            .ok_or(ClaimsServiceError::NotFound)?;

        if credentials.is_settled() {
            return Ok(None);
        }

        let record = self
            .claims
            .get_claim(&mut tx, claim)
            .await?
            .ok_or(ClaimsServiceError::NotFound)?;

        let issuer = self
            .issuers
            .get_issuer(&mut tx, record.promotion_uuid)
            .await?
            .ok_or(ClaimsServiceError::PromotionNotFound)?;

        tx.commit().await?;

        Ok(Some((credentials, issuer.signer_name())))
    }

    /// `None` when the signer rejected the tokens or attempts ran out.
    async fn sign_with_retry(
        &self,
        signer_name: &str,
        credentials: &CredentialRecord,
    ) -> Option<SignedCredentials> {
        let mut backoff = self.policy.initial_backoff;

        for attempt in 1..=self.policy.max_attempts {
            match self
                .signer
                .sign_credentials(signer_name, &credentials.blinded_creds)
                .await
            {
                Ok(signed) => return Some(signed),
                Err(source) if source.is_permanent() => {
                    warn!(
                        claim_uuid = %credentials.claim_uuid,
                        "signer rejected credentials: {source}"
                    );

                    return None;
                }
                Err(source) => {
                    warn!(
                        claim_uuid = %credentials.claim_uuid,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        "transient signer failure: {source}"
                    );

                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                    }
                }
            }
        }

        None
    }

    async fn attach(
        &self,
        claim: ClaimUuid,
        signed: &SignedCredentials,
    ) -> Result<(), ClaimsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .credentials
            .attach_signed_credentials(&mut tx, claim, signed)
            .await?;

        tx.commit().await?;

        if rows_affected == 0 {
            info!(claim_uuid = %claim, "claim settled elsewhere, discarding signed credentials");
            return Ok(());
        }

        metrics::record_issued_credentials();

        info!(claim_uuid = %claim, "attached signed credentials");

        Ok(())
    }

    async fn mark_failed(&self, claim: ClaimUuid) -> Result<(), ClaimsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.credentials.mark_issuance_failed(&mut tx, claim).await?;

        tx.commit().await?;

        if rows_affected > 0 {
            warn!(claim_uuid = %claim, "marked claim issuance as failed");
        }

        Ok(())
    }
}
