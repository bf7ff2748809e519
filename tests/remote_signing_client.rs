//! Remote signing backend client tests.
//!
//! Drives `RemoteSigningClient` against a `wiremock` backend and checks the
//! multipart contract, session cookie affinity and error classification.

mod common;

use common::*;
use pdf_remote_signer::{
    CandidateFile, RemoteSigningApi, SelectedDocument, SigningError, Thumbprint,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn document() -> SelectedDocument {
    SelectedDocument::from_candidate(CandidateFile::new(
        "contract.pdf",
        "application/pdf",
        ORIGINAL_PDF.to_vec(),
    ))
    .unwrap()
}

fn thumbprint() -> Thumbprint {
    Thumbprint::new(THUMBPRINT).unwrap()
}

#[tokio::test]
async fn start_uploads_document_certificate_and_thumbprint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/start"))
        .and(body_string_contains("name=\"file\"; filename=\"contract.pdf\""))
        .and(body_string_contains("original-body"))
        .and(body_string_contains("name=\"certContent\""))
        .and(body_string_contains(CERTIFICATE_B64))
        .and(body_string_contains("name=\"certThumb\""))
        .and(body_string_contains(THUMBPRINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(start_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = remote_client(&server);
    let prepared = client
        .start(&document(), CERTIFICATE_B64, &thumbprint())
        .await
        .unwrap();

    assert_eq!(prepared.to_sign_hash(), TO_SIGN_HASH);
    assert_eq!(prepared.decode_document().unwrap(), b"%PDF-1.7\nprepared\n");
}

#[tokio::test]
async fn complete_uploads_only_the_signature_on_the_same_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=c0ffee; Path=/")
                .set_body_json(start_response()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/complete"))
        .and(header("cookie", "JSESSIONID=c0ffee"))
        .and(body_string_contains("name=\"signedHash\""))
        .and(body_string_contains(SIGNATURE_B64))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(SIGNED_PDF),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = remote_client(&server);
    client
        .start(&document(), CERTIFICATE_B64, &thumbprint())
        .await
        .unwrap();
    let signed = client.complete(SIGNATURE_B64).await.unwrap();

    assert_eq!(signed.as_bytes(), SIGNED_PDF);

    let requests = server.received_requests().await.unwrap();
    let complete_body = String::from_utf8_lossy(&requests[1].body).to_string();
    assert!(!complete_body.contains("certContent"));
    assert!(!complete_body.contains("original-body"));
}

#[tokio::test]
async fn start_server_error_is_start_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/start"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;

    let err = remote_client(&server)
        .start(&document(), CERTIFICATE_B64, &thumbprint())
        .await
        .unwrap_err();

    match err {
        SigningError::RemoteStartFailed(detail) => assert!(detail.contains("500")),
        other => panic!("Wrong error type: {other:?}"),
    }
}

#[tokio::test]
async fn start_with_unparseable_body_is_start_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = remote_client(&server)
        .start(&document(), CERTIFICATE_B64, &thumbprint())
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::RemoteStartFailed(_)));
}

#[tokio::test]
async fn complete_without_session_is_session_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/complete"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "status": 400,
            "code": "SESSION_NOT_FOUND",
            "message": "No signing in progress",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = remote_client(&server)
        .complete(SIGNATURE_B64)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::SessionNotFound(_)));
    assert_eq!(err.user_message(), "Signing session expired, please sign again.");
}

#[tokio::test]
async fn complete_server_error_is_complete_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/complete"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = remote_client(&server)
        .complete(SIGNATURE_B64)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::RemoteCompleteFailed(_)));
}

#[tokio::test]
async fn complete_with_empty_body_is_complete_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/remote-signing/complete"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = remote_client(&server)
        .complete(SIGNATURE_B64)
        .await
        .unwrap_err();
    assert!(matches!(err, SigningError::RemoteCompleteFailed(_)));
}

#[tokio::test]
async fn unreachable_backend_classifies_by_phase() {
    let server = MockServer::start().await;
    let client = remote_client(&server);
    drop(server);

    let start = client
        .start(&document(), CERTIFICATE_B64, &thumbprint())
        .await
        .unwrap_err();
    let complete = client.complete(SIGNATURE_B64).await.unwrap_err();

    assert!(matches!(start, SigningError::RemoteStartFailed(_)));
    assert!(matches!(complete, SigningError::RemoteCompleteFailed(_)));
}
