//! Adapter layer modules for external system integration.
//!
//! Provides adapters for:
//! - The local certificate agent that holds the user's signing keys
//! - The remote signing backend and its two-phase protocol

pub mod agent;
pub mod provider;
pub mod remote;
