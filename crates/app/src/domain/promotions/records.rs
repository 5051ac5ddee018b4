//! Promotions Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::uuids::TypedUuid;

/// Promotion UUID
pub type PromotionUuid = TypedUuid<PromotionRecord>;

/// Promotion Record
#[derive(Debug, Clone)]
pub struct PromotionRecord {
    pub uuid: PromotionUuid,
    pub promotion_type: String,
    pub version: i32,
    pub suggestions_per_grant: i32,
    pub approximate_value: Decimal,
    pub active: bool,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl PromotionRecord {
    /// Whether the promotion's activation window has passed.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }

    /// Whether a wallet may claim this promotion right now.
    #[must_use]
    pub fn is_claimable(&self, now: Timestamp) -> bool {
        self.active && !self.is_expired(now)
    }
}

/// A promotion paired with its availability for a particular wallet.
#[derive(Debug, Clone)]
pub struct AvailablePromotion {
    pub promotion: PromotionRecord,

    /// `active && not yet claimed by the wallet`.
    pub available: bool,
}

/// Issuer UUID
pub type IssuerUuid = TypedUuid<IssuerRecord>;

/// Issuer Record
///
/// The signing identity bound to a promotion at activation. Key
/// material lives with the external signer; we only hold the binding.
#[derive(Debug, Clone)]
pub struct IssuerRecord {
    pub uuid: IssuerUuid,
    pub promotion_uuid: PromotionUuid,
    pub cohort: String,
    pub created_at: Timestamp,
}

impl IssuerRecord {
    /// The name the signer keys this issuer by.
    #[must_use]
    pub fn signer_name(&self) -> String {
        format!("{}.{}", self.promotion_uuid, self.cohort)
    }
}
