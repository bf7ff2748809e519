//! Wire format of the remote signing backend.
//!
//! Requests are multipart forms (field names live in
//! [`crate::domain::constants`]); the `start` response is the JSON form of
//! [`crate::domain::document::PreparedDocument`]; errors come back as JSON.

use serde::{Deserialize, Serialize};

/// Error codes the backend may put in [`ErrorResponse::code`].
pub mod error_codes {
    /// `complete` arrived without a matching `start` on the same session.
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
}

/// JSON error body.
///
/// Every field is optional: servers differ in which ones they fill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// Whether the backend lost (or never had) the signing session.
    #[must_use]
    pub fn is_session_not_found(&self) -> bool {
        if self.code.as_deref() == Some(error_codes::SESSION_NOT_FOUND) {
            return true;
        }
        self.message
            .as_deref()
            .is_some_and(|m| m.to_ascii_lowercase().contains("not found in session"))
    }

    /// Best human-readable summary of the body.
    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.code, &self.error, &self.message) {
            (Some(code), _, Some(message)) => format!("[{code}] {message}"),
            (None, Some(error), Some(message)) => format!("{error}: {message}"),
            (_, _, Some(message)) => message.clone(),
            (_, Some(error), None) => error.clone(),
            (Some(code), None, None) => code.clone(),
            (None, None, None) => "no error detail".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_detection() {
        let by_code = ErrorResponse {
            code: Some(error_codes::SESSION_NOT_FOUND.to_string()),
            ..Default::default()
        };
        assert!(by_code.is_session_not_found());

        // Body shape produced by a servlet container for a failed assertion
        let by_message: ErrorResponse = serde_json::from_str(
            r#"{"status":500,"error":"Internal Server Error","message":"Prepared PDF bytes not found in session","path":"/remote-signing/complete"}"#,
        )
        .unwrap();
        assert!(by_message.is_session_not_found());
        assert_eq!(
            by_message.summary(),
            "Internal Server Error: Prepared PDF bytes not found in session"
        );

        let other = ErrorResponse {
            message: Some("Invalid certificate".to_string()),
            ..Default::default()
        };
        assert!(!other.is_session_not_found());
    }
}
