//! Local signing agent client.
//!
//! Talks to the agent process that owns the user's certificate store and
//! exposes it as a [`CertificateProvider`].

use super::protocol::{
    endpoints, error_codes, CertificateModel, ErrorResponse, ListCertificatesRequest,
    ListCertificatesResponse, ReadCertificateRequest, ReadCertificateResponse, SignDataRequest,
    SignDataResponse, StatusRequest, StatusResponse,
};
use crate::adapters::provider::CertificateProvider;
use crate::domain::constants::DEFAULT_TIMEOUT_SECS;
use crate::domain::identity::{SigningIdentity, SubjectIdentifiers};
use crate::domain::types::{ApiBaseUrl, DigestAlgorithm, Thumbprint};
use crate::infra::error::{SigningError, SigningResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Configuration for connecting to the local signing agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Base URL of the agent (e.g., `http://127.0.0.1:8443`).
    pub base_url: ApiBaseUrl,
    /// Bearer token, if the agent requires one.
    pub auth_token: Option<String>,
    /// Timeout in seconds for status, listing and export calls.
    pub timeout_secs: u64,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
}

impl AgentConfig {
    /// Create a new agent configuration.
    #[must_use]
    pub fn new(base_url: ApiBaseUrl) -> Self {
        Self {
            base_url,
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the housekeeping timeout.
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
}

/// Which agent call failed; decides how transport errors are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentCall {
    Status,
    List,
    Export,
    Sign,
}

/// [`CertificateProvider`] backed by the local signing agent.
pub struct LocalAgentProvider {
    config: AgentConfig,
    client: reqwest::Client,
    ready: AtomicBool,
}

impl LocalAgentProvider {
    /// Create a new agent client.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: AgentConfig) -> SigningResult<Self> {
        // No client-wide timeout: signing waits on the user's prompt.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| {
                SigningError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            client,
            ready: AtomicBool::new(false),
        })
    }

    /// Whether `initialize` has succeeded.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn ensure_ready(&self) -> SigningResult<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(SigningError::ProviderUnavailable(
                "Signing agent has not been initialized".to_string(),
            ))
        }
    }

    /// POST a JSON request and decode the JSON response.
    async fn post<Req, Resp>(
        &self,
        call: AgentCall,
        endpoint: &str,
        request: &Req,
    ) -> SigningResult<Resp>
    where
        Req: serde::Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let url = self.config.base_url.join(&[endpoint]);
        let mut builder = self.client.post(&url).json(request);

        if call != AgentCall::Sign {
            builder = builder.timeout(Duration::from_secs(self.config.timeout_secs));
        }
        if let Some(token) = &self.config.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            Self::transport_error(call, &format!("Failed to reach agent at {url}: {e}"))
        })?;

        Self::handle_response(call, response).await
    }

    /// Handle HTTP response and parse JSON body.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        call: AgentCall,
        response: reqwest::Response,
    ) -> SigningResult<T> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                Self::transport_error(call, &format!("Failed to parse agent response: {e}"))
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                Err(Self::map_error_code(call, &error_response))
            } else {
                Err(Self::transport_error(
                    call,
                    &format!("Agent error {status}: {error_text}"),
                ))
            }
        }
    }

    /// Failures without an agent error code.
    fn transport_error(call: AgentCall, message: &str) -> SigningError {
        match call {
            AgentCall::Sign => SigningError::SigningFailed(message.to_string()),
            AgentCall::Status | AgentCall::List | AgentCall::Export => {
                SigningError::ProviderUnavailable(message.to_string())
            }
        }
    }

    /// Map error codes to appropriate `SigningError` variants.
    fn map_error_code(call: AgentCall, error: &ErrorResponse) -> SigningError {
        match error.error_code.as_str() {
            error_codes::AUTH_FAILED | error_codes::NOT_READY | error_codes::VERSION_MISMATCH => {
                SigningError::ProviderUnavailable(format!(
                    "[{}] {}",
                    error.error_code, error.message
                ))
            }
            error_codes::CERT_NOT_FOUND => {
                SigningError::IdentityNotFound(format!("Certificate not found: {}", error.message))
            }
            error_codes::USER_CANCELLED => SigningError::SigningDenied(error.message.clone()),
            error_codes::SIGNING_FAILED => SigningError::SigningFailed(error.message.clone()),
            _ => Self::transport_error(
                call,
                &format!("Agent error [{}]: {}", error.error_code, error.message),
            ),
        }
    }

    fn to_identity(model: CertificateModel) -> Option<SigningIdentity> {
        let thumbprint = match Thumbprint::new(&model.thumbprint) {
            Ok(thumbprint) => thumbprint,
            Err(e) => {
                log::warn!("Skipping certificate with invalid thumbprint: {e}");
                return None;
            }
        };

        Some(SigningIdentity::new(
            thumbprint,
            model.subject_name,
            model.issuer_name,
            SubjectIdentifiers::new(model.pki_brazil.cpf, model.pki_brazil.cnpj),
        ))
    }
}

#[async_trait::async_trait]
impl CertificateProvider for LocalAgentProvider {
    async fn initialize(&self) -> SigningResult<()> {
        self.ready.store(false, Ordering::Release);

        let status: StatusResponse = self
            .post(AgentCall::Status, endpoints::STATUS, &StatusRequest::new())
            .await?;

        if !status.ready {
            return Err(SigningError::ProviderUnavailable(
                "Signing agent reports its certificate store is not ready".to_string(),
            ));
        }

        log::info!(
            "Connected to signing agent at {} (protocol {}, agent {:?})",
            self.config.base_url,
            status.version,
            status.agent_version
        );
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    async fn list_identities(&self) -> SigningResult<Vec<SigningIdentity>> {
        self.ensure_ready()?;

        let response: ListCertificatesResponse = self
            .post(
                AgentCall::List,
                endpoints::CERTIFICATES,
                &ListCertificatesRequest::new(),
            )
            .await?;

        log::debug!("Agent listed {} certificate(s)", response.certificates.len());
        Ok(response
            .certificates
            .into_iter()
            .filter_map(Self::to_identity)
            .collect())
    }

    async fn export_certificate(&self, thumbprint: &Thumbprint) -> SigningResult<String> {
        self.ensure_ready()?;

        let response: ReadCertificateResponse = self
            .post(
                AgentCall::Export,
                endpoints::CERTIFICATE,
                &ReadCertificateRequest::new(thumbprint.as_str()),
            )
            .await?;

        Ok(response.certificate_b64)
    }

    async fn sign(
        &self,
        hash: &str,
        thumbprint: &Thumbprint,
        digest_algorithm: DigestAlgorithm,
    ) -> SigningResult<String> {
        self.ensure_ready()?;

        let request =
            SignDataRequest::new(thumbprint.as_str(), hash, digest_algorithm.as_str()).with_nonce();
        let response: SignDataResponse =
            self.post(AgentCall::Sign, endpoints::SIGN, &request).await?;

        if !response.nonce_matches(request.nonce.as_deref()) {
            return Err(SigningError::SigningFailed(
                "Agent response nonce does not match the request".to_string(),
            ));
        }

        Ok(response.signature_b64)
    }
}
