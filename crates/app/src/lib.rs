//! Shared domain, persistence, and issuance modules for the rewards
//! grant service.

pub mod context;
pub mod database;
pub mod dedup;
pub mod domain;
pub mod ledger;
pub mod metrics;
pub mod signer;

#[cfg(test)]
mod test;

mod uuids;
