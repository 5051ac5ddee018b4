pub(crate) mod issuers;
pub(crate) mod promotions;
