//! Local signing agent adapter.
//!
//! The agent is a companion process on the user's machine that keeps the
//! certificate store and prompts the user before every signature. This
//! module speaks its JSON protocol.

pub mod client;
pub mod protocol;

pub use client::{AgentConfig, LocalAgentProvider};
