pub(crate) mod action;
pub(crate) mod engine;
pub(crate) mod transform;
