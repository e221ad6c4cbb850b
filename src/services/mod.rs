pub(crate) mod extraction;
pub(crate) mod reports;
