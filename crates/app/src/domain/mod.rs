//! Rewards Domain Concerns

pub mod claims;
pub mod promotions;
pub mod wallets;
