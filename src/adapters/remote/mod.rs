//! Remote signing backend adapter.
//!
//! The backend embeds a signature field into the document (`start`) and
//! later injects the client-produced signature into it (`complete`). Both
//! calls are bound together by the backend's session cookie.

pub mod client;
pub mod protocol;

pub use client::{RemoteSigningApi, RemoteSigningClient, RemoteSigningConfig};
