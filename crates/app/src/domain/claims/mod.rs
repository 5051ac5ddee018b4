//! Claims Domain

pub mod data;
mod errors;
mod issuance;
pub mod records;
mod repositories;
pub mod service;

pub use errors::ClaimsServiceError;
pub use issuance::IssuancePolicy;
pub use service::*;
