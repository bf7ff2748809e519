//! Remote signing backend client.
//!
//! Wraps the two-phase protocol:
//! 1. `start` uploads the document, certificate and thumbprint and receives
//!    the prepared document plus the value to sign.
//! 2. `complete` uploads the signature and receives the signed PDF.
//!
//! The HTTP client keeps a cookie jar so that both calls travel on the same
//! backend session. No call is ever retried here.

use super::protocol::ErrorResponse;
use crate::domain::constants::{
    COMPLETE_ENDPOINT, DEFAULT_TIMEOUT_SECS, FIELD_CERT_CONTENT, FIELD_CERT_THUMB, FIELD_FILE,
    FIELD_SIGNED_HASH, PDF_MEDIA_TYPE, REMOTE_SIGNING_PREFIX, START_ENDPOINT,
};
use crate::domain::document::{PreparedDocument, SelectedDocument, SignedDocument};
use crate::domain::types::{ApiBaseUrl, Thumbprint};
use crate::infra::error::{SigningError, SigningResult};
use reqwest::multipart::{Form, Part};

/// Two-phase remote signing protocol.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RemoteSigningApi: Send + Sync {
    /// Phase one: prepare the document for signing.
    ///
    /// # Errors
    /// `RemoteStartFailed` on transport errors or any non-success status.
    async fn start(
        &self,
        document: &SelectedDocument,
        certificate_b64: &str,
        thumbprint: &Thumbprint,
    ) -> SigningResult<PreparedDocument>;

    /// Phase two: hand over the signature, receive the signed document.
    ///
    /// # Errors
    /// `SessionNotFound` when the backend has no prior `start` for this
    /// session, `RemoteCompleteFailed` otherwise.
    async fn complete(&self, signed_hash: &str) -> SigningResult<SignedDocument>;
}

/// Configuration for the remote signing backend.
#[derive(Debug, Clone)]
pub struct RemoteSigningConfig {
    /// API base URL; endpoints live under `{base}/remote-signing/`.
    pub base_url: ApiBaseUrl,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Whether to verify TLS certificates (should be true in production).
    pub verify_tls: bool,
}

impl RemoteSigningConfig {
    /// Create a new backend configuration.
    #[must_use]
    pub fn new(base_url: ApiBaseUrl) -> Self {
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Disable TLS verification (for testing only!).
    #[must_use]
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    fn endpoint(&self, name: &str) -> String {
        self.base_url.join(&[REMOTE_SIGNING_PREFIX, name])
    }
}

/// HTTP implementation of [`RemoteSigningApi`].
pub struct RemoteSigningClient {
    config: RemoteSigningConfig,
    client: reqwest::Client,
}

impl RemoteSigningClient {
    /// Create a new backend client with its own session cookie jar.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: RemoteSigningConfig) -> SigningResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| {
                SigningError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &RemoteSigningConfig {
        &self.config
    }

    /// Decode an error body, falling back to the raw text.
    async fn error_detail(response: reqwest::Response) -> (Option<ErrorResponse>, String) {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorResponse>(&error_text) {
            Ok(body) => {
                let detail = format!("Server error {status}: {}", body.summary());
                (Some(body), detail)
            }
            Err(_) => (None, format!("Server error {status}: {error_text}")),
        }
    }
}

#[async_trait::async_trait]
impl RemoteSigningApi for RemoteSigningClient {
    async fn start(
        &self,
        document: &SelectedDocument,
        certificate_b64: &str,
        thumbprint: &Thumbprint,
    ) -> SigningResult<PreparedDocument> {
        let url = self.config.endpoint(START_ENDPOINT);
        log::info!(
            "Starting remote signing of {} ({} bytes)",
            document.file_name(),
            document.len()
        );
        log::debug!(
            "Uploading {} as multipart ({} base64 chars)",
            document.file_name(),
            document.base64().len()
        );

        let file_part = Part::bytes(document.bytes().to_vec())
            .file_name(document.file_name().to_string())
            .mime_str(PDF_MEDIA_TYPE)
            .map_err(|e| SigningError::RemoteStartFailed(format!("Invalid file part: {e}")))?;
        let form = Form::new()
            .part(FIELD_FILE, file_part)
            .text(FIELD_CERT_CONTENT, certificate_b64.to_string())
            .text(FIELD_CERT_THUMB, thumbprint.as_str().to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SigningError::RemoteStartFailed(format!("Failed to reach {url}: {e}")))?;

        if !response.status().is_success() {
            let (_, detail) = Self::error_detail(response).await;
            return Err(SigningError::RemoteStartFailed(detail));
        }

        let prepared: PreparedDocument = response.json().await.map_err(|e| {
            SigningError::RemoteStartFailed(format!("Failed to parse start response: {e}"))
        })?;

        log::debug!(
            "Prepared document received ({} base64 chars)",
            prepared.prepared_pdf_bytes.len()
        );
        Ok(prepared)
    }

    async fn complete(&self, signed_hash: &str) -> SigningResult<SignedDocument> {
        let url = self.config.endpoint(COMPLETE_ENDPOINT);
        log::info!("Completing remote signing");

        let form = Form::new().text(FIELD_SIGNED_HASH, signed_hash.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                SigningError::RemoteCompleteFailed(format!("Failed to reach {url}: {e}"))
            })?;

        if !response.status().is_success() {
            let (body, detail) = Self::error_detail(response).await;
            if body.as_ref().is_some_and(ErrorResponse::is_session_not_found) {
                return Err(SigningError::SessionNotFound(detail));
            }
            return Err(SigningError::RemoteCompleteFailed(detail));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Some(content_type) = content_type.as_deref() {
            if !content_type.starts_with(PDF_MEDIA_TYPE) {
                log::warn!("Backend returned signed document as {content_type}");
            }
        }

        let bytes = response.bytes().await.map_err(|e| {
            SigningError::RemoteCompleteFailed(format!("Failed to read signed document: {e}"))
        })?;

        if bytes.is_empty() {
            return Err(SigningError::RemoteCompleteFailed(
                "Backend returned an empty document".to_string(),
            ));
        }

        Ok(SignedDocument::new(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let base_url = ApiBaseUrl::new("https://sign.example.com/api").unwrap();
        let config = RemoteSigningConfig::new(base_url)
            .with_timeout(60)
            .with_insecure_tls();

        assert_eq!(config.timeout_secs, 60);
        assert!(!config.verify_tls);
        assert_eq!(
            config.endpoint(START_ENDPOINT),
            "https://sign.example.com/api/remote-signing/start"
        );
        assert_eq!(
            config.endpoint(COMPLETE_ENDPOINT),
            "https://sign.example.com/api/remote-signing/complete"
        );
    }
}
