//! Certificate provider abstraction.
//!
//! The workflow never touches private keys. Everything that involves the
//! user's certificates goes through this trait, implemented by the local
//! agent client in production and by mocks in tests.

use crate::domain::identity::SigningIdentity;
use crate::domain::types::{DigestAlgorithm, Thumbprint};
use crate::infra::error::SigningResult;

/// Local signing capability.
///
/// `initialize` must succeed before any other call; implementations
/// answer `ProviderUnavailable` otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CertificateProvider: Send + Sync {
    /// Establish that the local signing capability is reachable.
    ///
    /// # Errors
    /// `ProviderUnavailable` when the agent is not installed or not running.
    async fn initialize(&self) -> SigningResult<()>;

    /// Enumerate every identity the provider knows, eligible or not.
    ///
    /// # Errors
    /// `ProviderUnavailable` when the agent cannot be reached.
    async fn list_identities(&self) -> SigningResult<Vec<SigningIdentity>>;

    /// Export the public certificate of an identity, base64 encoded.
    ///
    /// # Errors
    /// `IdentityNotFound` when the thumbprint is stale or unknown.
    async fn export_certificate(&self, thumbprint: &Thumbprint) -> SigningResult<String>;

    /// Sign `hash` with the identity's private key.
    ///
    /// May wait indefinitely on a user prompt; no timeout is applied here.
    ///
    /// # Errors
    /// `SigningDenied` when the user refuses, `SigningFailed` otherwise.
    async fn sign(
        &self,
        hash: &str,
        thumbprint: &Thumbprint,
        digest_algorithm: DigestAlgorithm,
    ) -> SigningResult<String>;
}
