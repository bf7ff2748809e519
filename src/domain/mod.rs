//! Domain layer: plain data exchanged between the workflow and its adapters.

pub mod constants;
pub mod document;
pub mod identity;
pub mod types;
