//! Claim Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    domain::{promotions::records::PromotionUuid, wallets::records::WalletUuid},
    signer::SignedCredentials,
    uuids::TypedUuid,
};

/// Claim UUID
pub type ClaimUuid = TypedUuid<ClaimRecord>;

/// Claim Record
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub uuid: ClaimUuid,
    pub promotion_uuid: PromotionUuid,
    pub wallet_uuid: WalletUuid,
    pub approximate_value: Decimal,
    pub bonus: Decimal,
    pub redeemed: bool,
    pub created_at: Timestamp,
}

/// Credential Record
///
/// One row per claim. Blinded tokens are stored at registration;
/// signed tokens, the proof, and the public key arrive later from the
/// issuance worker. `failed_at` is terminal.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub claim_uuid: ClaimUuid,
    pub blinded_creds: Vec<String>,
    pub signed_creds: Option<Vec<String>>,
    pub batch_proof: Option<String>,
    pub public_key: Option<String>,
    pub failed_at: Option<Timestamp>,
}

impl CredentialRecord {
    /// Whether issuance has reached a terminal state, signed or failed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.signed_creds.is_some() || self.failed_at.is_some()
    }

    /// The point-read status a client polling this claim observes.
    #[must_use]
    pub fn status(&self) -> ClaimStatus {
        if self.failed_at.is_some() {
            return ClaimStatus::Failed;
        }

        match (&self.signed_creds, &self.batch_proof, &self.public_key) {
            (Some(signed_creds), Some(batch_proof), Some(public_key)) => {
                ClaimStatus::Completed(SignedCredentials {
                    signed_creds: signed_creds.clone(),
                    batch_proof: batch_proof.clone(),
                    public_key: public_key.clone(),
                })
            }
            _ => ClaimStatus::Pending,
        }
    }
}

/// Issuance state of a claim as observed by a polling client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimStatus {
    /// Registered, credentials not yet signed.
    Pending,

    /// Signed credentials are attached and ready to hand out.
    Completed(SignedCredentials),

    /// Issuance ended without signed credentials.
    Failed,
}

/// Aggregate of a wallet's claims for one promotion type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSummary {
    pub earnings: Decimal,
    pub last_claim: Timestamp,
    pub claim_type: String,
}
