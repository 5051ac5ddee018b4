//! Claims input data.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    claims::records::ClaimUuid,
    promotions::records::PromotionUuid,
    wallets::records::WalletUuid,
};

/// A wallet's request to claim a promotion.
#[derive(Debug, Clone)]
pub struct ClaimRequest {
    pub promotion: PromotionUuid,

    /// The wallet's payment ID as issued by the ledger.
    pub payment_id: Uuid,

    /// Blinded tokens to be signed, opaque to this service.
    pub blinded_creds: Vec<String>,
}

/// Row values for a claim insert.
#[derive(Debug, Clone)]
pub(crate) struct NewClaim {
    pub uuid: ClaimUuid,
    pub promotion: PromotionUuid,
    pub wallet: WalletUuid,
    pub approximate_value: Decimal,
    pub bonus: Decimal,
}
