//! In-memory doubles for the external signer and ledger.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    dedup::{ClaimDedup, DedupError},
    domain::{promotions::records::PromotionUuid, wallets::records::WalletUuid},
    ledger::{LedgerClient, LedgerError, WalletInfo},
    signer::{CredentialSigner, SignedCredentials, SignerError},
};

/// Signer double with a scriptable failure schedule.
#[derive(Debug, Default)]
pub(crate) struct StubSigner {
    transient_failures: AtomicU32,
    reject: bool,
    calls: AtomicU32,
}

impl StubSigner {
    /// Signs every request on the first attempt.
    pub(crate) fn ok() -> Self {
        Self::default()
    }

    /// Permanently rejects every request.
    pub(crate) fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    /// Fails the first `n` requests transiently, then signs.
    pub(crate) fn failing_times(n: u32) -> Self {
        Self {
            transient_failures: AtomicU32::new(n),
            ..Self::default()
        }
    }

    /// Number of sign requests received so far.
    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSigner for StubSigner {
    async fn sign_credentials(
        &self,
        issuer: &str,
        blinded_creds: &[String],
    ) -> Result<SignedCredentials, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.reject {
            return Err(SignerError::Rejected {
                status: 400,
                message: "invalid blinded tokens".to_string(),
            });
        }

        let remaining = self.transient_failures.load(Ordering::SeqCst);

        if remaining > 0 {
            self.transient_failures
                .store(remaining.saturating_sub(1), Ordering::SeqCst);

            return Err(SignerError::UnexpectedResponse(
                "signer overloaded".to_string(),
            ));
        }

        Ok(SignedCredentials {
            signed_creds: blinded_creds
                .iter()
                .map(|blinded| format!("signed:{blinded}"))
                .collect(),
            batch_proof: format!("proof:{issuer}"),
            public_key: format!("pk:{issuer}"),
        })
    }
}

/// Dedup double that never holds a marker, leaving duplicate claims to
/// the unique constraint on the claims table.
#[derive(Debug, Default)]
pub(crate) struct PassThroughDedup;

#[async_trait]
impl ClaimDedup for PassThroughDedup {
    async fn try_acquire(
        &self,
        _promotion: PromotionUuid,
        _wallet: WalletUuid,
    ) -> Result<bool, DedupError> {
        Ok(true)
    }

    async fn release(&self, _promotion: PromotionUuid, _wallet: WalletUuid) {}
}

/// Dedup double whose backend is always down.
#[derive(Debug, Default)]
pub(crate) struct UnavailableDedup;

#[async_trait]
impl ClaimDedup for UnavailableDedup {
    async fn try_acquire(
        &self,
        _promotion: PromotionUuid,
        _wallet: WalletUuid,
    ) -> Result<bool, DedupError> {
        Err(DedupError::Unavailable("connection refused".to_string()))
    }

    async fn release(&self, _promotion: PromotionUuid, _wallet: WalletUuid) {}
}

/// Ledger double backed by a map of registered wallets.
#[derive(Debug, Default)]
pub(crate) struct StubLedger {
    wallets: Mutex<HashMap<Uuid, WalletInfo>>,
}

impl StubLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Make the ledger resolve `payment_id` to a synthetic wallet.
    pub(crate) fn register_wallet(&self, payment_id: Uuid) -> Uuid {
        let wallet = WalletInfo {
            payment_id,
            provider: "uphold".to_string(),
            provider_id: Uuid::now_v7().to_string(),
            public_key: format!("pk:{payment_id}"),
        };

        self.wallets
            .lock()
            .expect("wallet map lock poisoned")
            .insert(payment_id, wallet);

        payment_id
    }
}

#[async_trait]
impl LedgerClient for StubLedger {
    async fn get_wallet(&self, payment_id: Uuid) -> Result<WalletInfo, LedgerError> {
        self.wallets
            .lock()
            .expect("wallet map lock poisoned")
            .get(&payment_id)
            .cloned()
            .ok_or(LedgerError::NotFound)
    }
}
