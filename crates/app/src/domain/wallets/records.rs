//! Wallet Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Wallet UUID (the payment ID the ledger resolves).
pub type WalletUuid = TypedUuid<WalletRecord>;

/// Wallet Record
#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub uuid: WalletUuid,
    pub provider: String,
    pub provider_id: String,
    pub public_key: String,
    pub created_at: Timestamp,
}
