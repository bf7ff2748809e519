//! Type-safe wrappers using new-type pattern
//!
//! Validated wrappers for the identifiers and URLs that cross the adapter
//! boundaries, so an empty thumbprint or a schemeless URL never reaches
//! the network.

use crate::infra::error::{SigningError, SigningResult};
use std::fmt;
use std::str::FromStr;

/// Base URL of an HTTP service (signing backend or local agent).
///
/// Stored without a trailing slash so endpoint paths can be appended
/// with a single `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBaseUrl(String);

impl ApiBaseUrl {
    /// Create a new `ApiBaseUrl` after validation
    pub fn new(url: impl AsRef<str>) -> SigningResult<Self> {
        let url = url.as_ref().trim();
        Self::validate_url(url)?;
        Ok(ApiBaseUrl(url.trim_end_matches('/').to_string()))
    }

    /// Get the URL as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join path segments onto the base URL.
    #[must_use]
    pub fn join(&self, segments: &[&str]) -> String {
        let mut url = self.0.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment.trim_matches('/'));
        }
        url
    }

    fn validate_url(url: &str) -> SigningResult<()> {
        let Some(rest) = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
        else {
            return Err(SigningError::ValidationError(format!(
                "URL must start with http:// or https://, got: {url}"
            )));
        };

        let host = rest.split('/').next().unwrap_or_default();
        if host.is_empty() {
            return Err(SigningError::ValidationError(format!(
                "URL has no host: {url}"
            )));
        }

        if url.chars().any(char::is_whitespace) {
            return Err(SigningError::ValidationError(format!(
                "URL must not contain whitespace: {url}"
            )));
        }

        Ok(())
    }
}

impl FromStr for ApiBaseUrl {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for ApiBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a certificate held by the local agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Thumbprint(String);

impl Thumbprint {
    /// Create a new `Thumbprint` after validation
    pub fn new(value: impl AsRef<str>) -> SigningResult<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(SigningError::ValidationError(
                "Certificate thumbprint must not be empty".to_string(),
            ));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(SigningError::ValidationError(format!(
                "Certificate thumbprint must not contain whitespace: {value}"
            )));
        }
        Ok(Thumbprint(value.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Thumbprint {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digest algorithm the local agent applies before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Name understood by the signing agent.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha384" => Ok(DigestAlgorithm::Sha384),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported digest algorithm: {s}"
            ))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
