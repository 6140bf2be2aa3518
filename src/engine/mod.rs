pub(crate) mod config;
pub(crate) mod section;
pub(crate) mod session;
