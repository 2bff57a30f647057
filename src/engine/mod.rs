pub(crate) mod config;
pub(crate) mod hero;
pub(crate) mod host;
