//! Claims Service

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    database::Db,
    dedup::ClaimDedup,
    domain::{
        claims::{
            ClaimsServiceError,
            data::{ClaimRequest, NewClaim},
            issuance::{IssuancePolicy, IssuanceWorker},
            records::{ClaimStatus, ClaimSummary, ClaimUuid},
            repositories::{claims::PgClaimsRepository, credentials::PgCredentialsRepository},
        },
        promotions::{
            PgPromotionsRepository,
            records::{PromotionRecord, PromotionUuid},
        },
        wallets::{records::WalletUuid, repository::PgWalletsRepository},
    },
    ledger::LedgerClient,
    metrics,
    signer::CredentialSigner,
};

#[derive(Clone)]
pub struct PgClaimsService {
    db: Db,
    claims: PgClaimsRepository,
    credentials: PgCredentialsRepository,
    promotions: PgPromotionsRepository,
    wallets: PgWalletsRepository,
    dedup: Arc<dyn ClaimDedup>,
    ledger: Arc<dyn LedgerClient>,
    signer: Arc<dyn CredentialSigner>,
    issuance: IssuancePolicy,
}

impl PgClaimsService {
    #[must_use]
    pub fn new(
        db: Db,
        dedup: Arc<dyn ClaimDedup>,
        ledger: Arc<dyn LedgerClient>,
        signer: Arc<dyn CredentialSigner>,
        issuance: IssuancePolicy,
    ) -> Self {
        Self {
            db,
            claims: PgClaimsRepository::new(),
            credentials: PgCredentialsRepository::new(),
            promotions: PgPromotionsRepository::new(),
            wallets: PgWalletsRepository::new(),
            dedup,
            ledger,
            signer,
            issuance,
        }
    }

    async fn claimable_promotion(
        &self,
        request: &ClaimRequest,
    ) -> Result<PromotionRecord, ClaimsServiceError> {
        let mut tx = self.db.begin().await?;

        let promotion = self
            .promotions
            .get_promotion(&mut tx, request.promotion)
            .await?
            .ok_or(ClaimsServiceError::PromotionNotFound)?;

        tx.commit().await?;

        if !promotion.is_claimable(Timestamp::now()) {
            return Err(ClaimsServiceError::NotClaimable);
        }

        Ok(promotion)
    }

    async fn register_claim(
        &self,
        request: &ClaimRequest,
        promotion: &PromotionRecord,
        wallet: WalletUuid,
    ) -> Result<ClaimUuid, ClaimsServiceError> {
        let wallet_info = self.ledger.get_wallet(request.payment_id).await?;

        let mut tx = self.db.begin().await?;

        self.wallets.upsert_wallet(&mut tx, &wallet_info).await?;

        let record = self
            .claims
            .create_claim(
                &mut tx,
                NewClaim {
                    uuid: ClaimUuid::new(),
                    promotion: promotion.uuid,
                    wallet,
                    approximate_value: promotion.approximate_value,
                    bonus: Decimal::ZERO,
                },
            )
            .await?;

        self.credentials
            .create_credentials(&mut tx, record.uuid, &request.blinded_creds)
            .await?;

        tx.commit().await?;

        Ok(record.uuid)
    }
}

#[async_trait]
impl ClaimsService for PgClaimsService {
    #[tracing::instrument(
        name = "claims.service.create_claim",
        skip(self, request),
        fields(
            promotion_uuid = %request.promotion,
            payment_id = %request.payment_id,
            blinded_creds = request.blinded_creds.len(),
        ),
        err
    )]
    async fn create_claim(&self, request: ClaimRequest) -> Result<ClaimUuid, ClaimsServiceError> {
        let promotion = self.claimable_promotion(&request).await?;

        // One blinded token per funded suggestion.
        if request.blinded_creds.len() != promotion.suggestions_per_grant.unsigned_abs() as usize {
            return Err(ClaimsServiceError::InvalidData);
        }

        let wallet = WalletUuid::from_uuid(request.payment_id);

        match self.dedup.try_acquire(promotion.uuid, wallet).await {
            Ok(true) => {}
            Ok(false) => return Err(ClaimsServiceError::AlreadyClaimed),
            // The claims table's unique constraint still rejects
            // duplicates when the marker store is down.
            Err(source) => warn!("dedup marker unavailable: {source}"),
        }

        match self.register_claim(&request, &promotion, wallet).await {
            Ok(claim) => {
                metrics::record_claimed_grant();

                IssuanceWorker::new(
                    self.db.clone(),
                    Arc::clone(&self.signer),
                    self.issuance.clone(),
                )
                .spawn(claim);

                info!(claim_uuid = %claim, "registered claim");

                Ok(claim)
            }
            Err(source) => {
                self.dedup.release(promotion.uuid, wallet).await;

                Err(source)
            }
        }
    }

    #[tracing::instrument(
        name = "claims.service.get_claim",
        skip(self),
        fields(promotion_uuid = %promotion, claim_uuid = %claim),
        err
    )]
    async fn get_claim(
        &self,
        promotion: PromotionUuid,
        claim: ClaimUuid,
    ) -> Result<ClaimStatus, ClaimsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .claims
            .get_claim(&mut tx, claim)
            .await?
            .filter(|record| record.promotion_uuid == promotion)
            .ok_or(ClaimsServiceError::NotFound)?;

        let credentials = self
            .credentials
            .get_credentials(&mut tx, record.uuid)
            .await?
            .ok_or(ClaimsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(credentials.status())
    }

    #[tracing::instrument(
        name = "claims.service.summarize_claims",
        skip(self),
        fields(wallet_uuid = %wallet, claim_type = %claim_type),
        err
    )]
    async fn summarize_claims(
        &self,
        wallet: WalletUuid,
        claim_type: String,
    ) -> Result<Option<ClaimSummary>, ClaimsServiceError> {
        let mut tx = self.db.begin().await?;

        let summary = self.claims.claim_summary(&mut tx, wallet, &claim_type).await?;

        tx.commit().await?;

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait ClaimsService: Send + Sync {
    /// Register a claim and start credential issuance in the
    /// background. Returns as soon as the claim row is committed.
    async fn create_claim(&self, request: ClaimRequest) -> Result<ClaimUuid, ClaimsServiceError>;

    /// Point-read of a claim's issuance state. The claim must belong
    /// to the given promotion.
    async fn get_claim(
        &self,
        promotion: PromotionUuid,
        claim: ClaimUuid,
    ) -> Result<ClaimStatus, ClaimsServiceError>;

    /// Aggregate a wallet's claims for one promotion type. `None` when
    /// the wallet has never claimed that type.
    async fn summarize_claims(
        &self,
        wallet: WalletUuid,
        claim_type: String,
    ) -> Result<Option<ClaimSummary>, ClaimsServiceError>;
}
