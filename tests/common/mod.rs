//! Shared fixtures for the HTTP integration tests.
//!
//! Both collaborators run as `wiremock` servers: one plays the signing
//! backend, the other the local signing agent.

#![allow(dead_code)]

use pdf_remote_signer::{
    AgentConfig, ApiBaseUrl, LocalAgentProvider, RemoteSigningClient, RemoteSigningConfig,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const THUMBPRINT: &str = "5F1C0A9E22D4";
pub const CERTIFICATE_B64: &str = "MIIC+zCCAeOgAwIBAgIJAKZ7";
pub const TO_SIGN_HASH: &str = "MYIBFzAYBgkqhkiG9w0BCQMxCwYJKoZIhvcNAQcB";
pub const SIGNATURE_B64: &str = "c2lnbmF0dXJlLWJ5dGVz";
/// base64 of `%PDF-1.7\nprepared\n`
pub const PREPARED_PDF_B64: &str = "JVBERi0xLjcKcHJlcGFyZWQK";

pub const ORIGINAL_PDF: &[u8] = b"%PDF-1.7\noriginal-body\n%%EOF\n";
pub const SIGNED_PDF: &[u8] = b"%PDF-1.7\nsigned-body\n%%EOF\n";

pub fn remote_client(server: &MockServer) -> RemoteSigningClient {
    let base_url = ApiBaseUrl::new(format!("{}/api", server.uri())).unwrap();
    RemoteSigningClient::new(RemoteSigningConfig::new(base_url).with_timeout(5)).unwrap()
}

pub fn agent_provider(server: &MockServer) -> LocalAgentProvider {
    let base_url = ApiBaseUrl::new(server.uri()).unwrap();
    LocalAgentProvider::new(AgentConfig::new(base_url).with_timeout(5)).unwrap()
}

pub fn start_response() -> Value {
    json!({
        "preparedPdfBytes": PREPARED_PDF_B64,
        "toSignHash": TO_SIGN_HASH,
    })
}

/// Answers sign requests with a fixed signature and the request's nonce.
pub struct EchoNonce {
    pub signature: &'static str,
}

impl Respond for EchoNonce {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "signature_b64": self.signature,
            "nonce": body.get("nonce").cloned().unwrap_or(Value::Null),
        }))
    }
}

/// Status, listing and certificate export for one eligible and one
/// ineligible certificate.
pub async fn mount_agent_basics(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "ready": true,
            "agent_version": "test-agent 0.1",
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/certificates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "certificates": [
                {
                    "thumbprint": THUMBPRINT,
                    "subject_name": "CN=Maria Silva:12345678901",
                    "issuer_name": "CN=AC Teste",
                    "pki_brazil": { "cpf": "12345678901" }
                },
                {
                    "thumbprint": "0011AABB",
                    "subject_name": "CN=Test Server",
                    "pki_brazil": {}
                }
            ],
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/certificate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.0",
            "certificate_b64": CERTIFICATE_B64,
        })))
        .mount(server)
        .await;
}
