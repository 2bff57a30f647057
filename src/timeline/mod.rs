pub(crate) mod callbacks;
pub(crate) mod controller;
