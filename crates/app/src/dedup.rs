//! Advisory claim dedup markers.
//!
//! A marker keyed by `(promotion, wallet)` rejects a second concurrent
//! claim attempt before it reaches the claims table. Markers expire on
//! their own and are advisory only; the unique constraint on `claims`
//! is the authoritative layer.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{promotions::records::PromotionUuid, wallets::records::WalletUuid};

/// Default lifetime of a dedup marker.
pub const DEFAULT_MARKER_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("dedup backend unavailable: {0}")]
    Unavailable(String),
}

#[automock]
#[async_trait]
pub trait ClaimDedup: Send + Sync {
    /// Set the marker for `(promotion, wallet)` if absent.
    ///
    /// Returns `false` when the marker is already held, meaning another
    /// claim attempt for the same pair is in flight or recently
    /// completed.
    async fn try_acquire(
        &self,
        promotion: PromotionUuid,
        wallet: WalletUuid,
    ) -> Result<bool, DedupError>;

    /// Drop the marker so a failed registration can be retried before
    /// the TTL elapses.
    async fn release(&self, promotion: PromotionUuid, wallet: WalletUuid);
}

/// In-process marker store.
///
/// The trait seam is the integration point for a shared cache; a
/// single-process deployment gets the same semantics from this map.
#[derive(Debug)]
pub struct InMemoryClaimDedup {
    ttl: Duration,
    markers: Mutex<HashMap<(Uuid, Uuid), Instant>>,
}

impl InMemoryClaimDedup {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            markers: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryClaimDedup {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_TTL)
    }
}

#[async_trait]
impl ClaimDedup for InMemoryClaimDedup {
    async fn try_acquire(
        &self,
        promotion: PromotionUuid,
        wallet: WalletUuid,
    ) -> Result<bool, DedupError> {
        let now = Instant::now();
        let mut markers = self.markers.lock().await;

        markers.retain(|_, set_at| now.duration_since(*set_at) < self.ttl);

        let key = (promotion.into_uuid(), wallet.into_uuid());

        if markers.contains_key(&key) {
            return Ok(false);
        }

        markers.insert(key, now);

        Ok(true)
    }

    async fn release(&self, promotion: PromotionUuid, wallet: WalletUuid) {
        let mut markers = self.markers.lock().await;

        markers.remove(&(promotion.into_uuid(), wallet.into_uuid()));
    }
}
