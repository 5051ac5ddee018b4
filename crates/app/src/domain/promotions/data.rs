//! Promotions Data

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::domain::promotions::records::PromotionUuid;

/// New Promotion Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewPromotion {
    pub uuid: PromotionUuid,
    pub promotion_type: String,
    pub suggestions_per_grant: i32,
    pub approximate_value: Decimal,

    /// Defaults at the storage layer when absent.
    pub expires_at: Option<Timestamp>,
}
