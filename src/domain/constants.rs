//! Protocol literals shared by the remote client, the agent client and the CLI.

// === Documents ===

/// Canonical media type accepted for signing.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Media type assumed for files whose extension is not recognised.
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// File name used for the signed document unless the caller picks one.
pub const DEFAULT_SIGNED_FILE_NAME: &str = "signed-document.pdf";

/// Suffix appended to the source stem when the output name is derived.
pub const DERIVED_NAME_SUFFIX: &str = "-signed";

// === Remote signing backend ===

/// Path segment (under the API base URL) of the two-phase endpoints.
pub const REMOTE_SIGNING_PREFIX: &str = "remote-signing";

/// Phase one: upload document and certificate, receive the hash to sign.
pub const START_ENDPOINT: &str = "start";

/// Phase two: upload the signature, receive the signed document.
pub const COMPLETE_ENDPOINT: &str = "complete";

/// Multipart field carrying the original PDF.
pub const FIELD_FILE: &str = "file";

/// Multipart field carrying the base64 certificate.
pub const FIELD_CERT_CONTENT: &str = "certContent";

/// Multipart field carrying the certificate thumbprint.
pub const FIELD_CERT_THUMB: &str = "certThumb";

/// Multipart field carrying the base64 signature.
pub const FIELD_SIGNED_HASH: &str = "signedHash";

// === Defaults ===

/// Default backend API base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4200/api";

/// Default local signing agent URL.
pub const DEFAULT_AGENT_URL: &str = "http://127.0.0.1:8443";

/// Default network timeout for backend and agent housekeeping calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
