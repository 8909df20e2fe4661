pub(crate) mod auth;
pub(crate) mod cors;
pub(crate) mod layers;
