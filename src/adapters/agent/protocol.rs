//! Protocol definitions for the local signing agent.
//!
//! Defines the JSON message format exchanged between this client and the
//! agent process that owns the user's certificate store.

use serde::{Deserialize, Serialize};

/// API version for protocol compatibility checks.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Endpoint paths, relative to the agent base URL.
pub mod endpoints {
    pub const STATUS: &str = "api/v1/status";
    pub const CERTIFICATES: &str = "api/v1/certificates";
    pub const CERTIFICATE: &str = "api/v1/certificate";
    pub const SIGN: &str = "api/v1/sign";
}

/// Health check / status request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub version: String,
}

/// Status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    /// Whether the certificate store is open and usable.
    pub ready: bool,
    /// Agent build identifier (if reported).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_version: Option<String>,
}

/// Request to enumerate the certificates in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCertificatesRequest {
    pub version: String,
}

/// Brazilian PKI fields extracted from the certificate subject.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PkiBrazilModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
}

/// One certificate as described by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateModel {
    pub thumbprint: String,
    pub subject_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,
    #[serde(default)]
    pub pki_brazil: PkiBrazilModel,
}

/// Certificate list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCertificatesResponse {
    pub version: String,
    pub certificates: Vec<CertificateModel>,
}

/// Request to read the public content of one certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadCertificateRequest {
    pub version: String,
    pub thumbprint: String,
}

/// Certificate content response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadCertificateResponse {
    pub version: String,
    /// Base64-encoded DER certificate.
    pub certificate_b64: String,
}

/// Request to sign data with one certificate's private key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignDataRequest {
    pub version: String,
    pub thumbprint: String,
    /// Data handed over verbatim; the agent digests and signs it.
    pub data: String,
    /// Digest algorithm name, e.g. `SHA-256`.
    pub digest_algorithm: String,
    /// Optional nonce for replay protection (base64).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Signature response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignDataResponse {
    pub version: String,
    /// Base64-encoded signature.
    pub signature_b64: String,
    /// Echo of the nonce if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Error response from the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub version: String,
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Known error codes returned by the agent.
pub mod error_codes {
    /// Bad or missing bearer token.
    pub const AUTH_FAILED: &str = "AUTH_FAILED";
    /// Certificate store not open yet.
    pub const NOT_READY: &str = "NOT_READY";
    /// Unknown thumbprint.
    pub const CERT_NOT_FOUND: &str = "CERT_NOT_FOUND";
    /// The user dismissed or refused the signing prompt.
    pub const USER_CANCELLED: &str = "USER_CANCELLED";
    /// Signing operation failed.
    pub const SIGNING_FAILED: &str = "SIGNING_FAILED";
    /// Malformed request.
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    /// Protocol version mismatch.
    pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
}

impl StatusRequest {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

impl Default for StatusRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl ListCertificatesRequest {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

impl Default for ListCertificatesRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadCertificateRequest {
    #[must_use]
    pub fn new(thumbprint: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            thumbprint: thumbprint.into(),
        }
    }
}

impl SignDataRequest {
    /// Create a new sign request.
    ///
    /// # Arguments
    /// * `thumbprint` - Certificate to sign with
    /// * `data` - Value to sign, passed through unchanged
    /// * `digest_algorithm` - Agent-side digest name
    #[must_use]
    pub fn new(
        thumbprint: impl Into<String>,
        data: impl Into<String>,
        digest_algorithm: impl Into<String>,
    ) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            thumbprint: thumbprint.into(),
            data: data.into(),
            digest_algorithm: digest_algorithm.into(),
            nonce: None,
        }
    }

    /// Add a nonce for replay protection.
    #[must_use]
    pub fn with_nonce(mut self) -> Self {
        use base64::Engine;
        let mut nonce_bytes = [0u8; 16];
        rand::fill(&mut nonce_bytes);
        self.nonce = Some(base64::engine::general_purpose::STANDARD.encode(nonce_bytes));
        self
    }
}

impl SignDataResponse {
    /// Whether the agent echoed the nonce we sent (or none was sent).
    #[must_use]
    pub fn nonce_matches(&self, sent: Option<&str>) -> bool {
        match sent {
            Some(expected) => self.nonce.as_deref() == Some(expected),
            None => true,
        }
    }
}

impl ErrorResponse {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            error_code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_request_keeps_data_verbatim() {
        let request = SignDataRequest::new("3A7F", "MYIBFzAYBgkq", "SHA-256").with_nonce();
        assert_eq!(request.data, "MYIBFzAYBgkq");
        assert_eq!(request.digest_algorithm, "SHA-256");
        assert_eq!(request.version, PROTOCOL_VERSION);
        assert_eq!(request.nonce.as_ref().map(String::len), Some(24));
    }

    #[test]
    fn test_nonce_echo_check() {
        let response = SignDataResponse {
            version: PROTOCOL_VERSION.to_string(),
            signature_b64: "c2ln".to_string(),
            nonce: Some("abc".to_string()),
        };
        assert!(response.nonce_matches(Some("abc")));
        assert!(!response.nonce_matches(Some("xyz")));
        assert!(response.nonce_matches(None));
    }

    #[test]
    fn test_certificate_model_defaults() {
        let json = r#"{"thumbprint":"AA","subject_name":"CN=Test"}"#;
        let model: CertificateModel = serde_json::from_str(json).unwrap();
        assert!(model.issuer_name.is_none());
        assert!(model.pki_brazil.cpf.is_none());
        assert!(model.pki_brazil.cnpj.is_none());
    }
}
