//! Documents as they move through the two signing phases.

use super::constants::PDF_MEDIA_TYPE;
use crate::infra::error::{SigningError, SigningResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// A file offered for signing, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl CandidateFile {
    #[must_use]
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    #[must_use]
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

/// A validated PDF together with its base64 form.
///
/// The base64 representation is computed once at selection time, so a
/// selected document is always ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDocument {
    file_name: String,
    bytes: Vec<u8>,
    base64: String,
}

impl SelectedDocument {
    /// Accept a candidate file if it is a PDF.
    ///
    /// # Errors
    /// Returns `InvalidFile` when the media type is not `application/pdf`.
    pub fn from_candidate(candidate: CandidateFile) -> SigningResult<Self> {
        if !candidate.is_pdf() {
            return Err(SigningError::InvalidFile(format!(
                "{} has media type {}, expected {PDF_MEDIA_TYPE}",
                candidate.file_name, candidate.media_type
            )));
        }

        let base64 = STANDARD.encode(&candidate.bytes);
        Ok(Self {
            file_name: candidate.file_name,
            bytes: candidate.bytes,
            base64,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn base64(&self) -> &str {
        &self.base64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of the `start` phase, produced entirely by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedDocument {
    /// Document with an embedded, not yet signed signature field (base64).
    pub prepared_pdf_bytes: String,
    /// Opaque value the local agent must sign.
    pub to_sign_hash: String,
}

impl PreparedDocument {
    /// Decode the prepared document bytes.
    ///
    /// # Errors
    /// Returns error if the backend sent malformed base64.
    pub fn decode_document(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.prepared_pdf_bytes)
    }

    #[must_use]
    pub fn to_sign_hash(&self) -> &str {
        &self.to_sign_hash
    }
}

/// Final output of the `complete` phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocument(Vec<u8>);

impl SignedDocument {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
