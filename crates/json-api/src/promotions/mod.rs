//! Promotion listing and claim HTTP surface.

pub(crate) mod errors;
pub(crate) mod handlers;

pub(crate) use handlers::{claim, get_claim, index, summary};
