pub(crate) mod claim;
pub(crate) mod get_claim;
pub(crate) mod index;
pub(crate) mod summary;
