//! Error types for remote PDF signing operations.

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Every failure the signing client can surface.
///
/// The first group mirrors the workflow taxonomy (file selection, readiness,
/// local certificate agent, remote backend). The trailing variants cover
/// configuration and local I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq, miette::Diagnostic)]
pub enum SigningError {
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Not ready to sign: {0}")]
    NotReady(String),

    #[error("Certificate provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Signing identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Signing denied: {0}")]
    SigningDenied(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Remote start failed: {0}")]
    RemoteStartFailed(String),

    #[error("Remote complete failed: {0}")]
    RemoteCompleteFailed(String),

    #[error("Signing session not found: {0}")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl SigningError {
    /// Fixed message suitable for the end user.
    ///
    /// Never includes the wrapped detail; that goes to the log instead.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            SigningError::InvalidFile(_) => "Invalid PDF!",
            SigningError::NotReady(_) => "Invalid PDF or Certificate!",
            SigningError::ProviderUnavailable(_) => {
                "Failed to initialize the certificate agent and load certificates!"
            }
            SigningError::IdentityNotFound(_) => "Selected certificate is no longer available.",
            SigningError::SigningDenied(_) => "Signing was cancelled.",
            SigningError::SigningFailed(_) => "Failed to sign PDF",
            SigningError::RemoteStartFailed(_) => "Failed to prepare PDF!",
            SigningError::RemoteCompleteFailed(_) => "Failed to complete PDF signature!",
            SigningError::SessionNotFound(_) => "Signing session expired, please sign again.",
            SigningError::ConfigurationError(_) => "Invalid configuration.",
            SigningError::IoError(_) => "Error reading or writing file",
            SigningError::ValidationError(_) => "Invalid input.",
        }
    }
}

impl From<std::io::Error> for SigningError {
    fn from(error: std::io::Error) -> Self {
        SigningError::IoError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SigningError::RemoteStartFailed("HTTP 500".to_string());
        assert_eq!(error.to_string(), "Remote start failed: HTTP 500");

        let error = SigningError::InvalidFile("text/plain".to_string());
        assert_eq!(error.to_string(), "Invalid file: text/plain");
    }

    #[test]
    fn test_user_message_hides_detail() {
        let error = SigningError::SigningFailed("PKCS#11 token error 0x80".to_string());
        assert!(!error.user_message().contains("0x80"));

        let error = SigningError::RemoteStartFailed("Server error 500: stack trace".to_string());
        assert_eq!(error.user_message(), "Failed to prepare PDF!");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.pdf");
        match SigningError::from(io) {
            SigningError::IoError(msg) => assert!(msg.contains("missing.pdf")),
            other => panic!("Wrong error type: {other:?}"),
        }
    }
}
