//! Reading candidate documents from disk.

use crate::domain::constants::{OCTET_STREAM_MEDIA_TYPE, PDF_MEDIA_TYPE};
use crate::domain::document::CandidateFile;
use crate::infra::error::{SigningError, SigningResult};
use std::path::Path;

/// Media type implied by a file's extension.
///
/// Only PDFs matter to the workflow; everything else is reported as an
/// octet stream so that selection rejects it.
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
        _ => OCTET_STREAM_MEDIA_TYPE,
    }
}

/// Read a file into a [`CandidateFile`].
///
/// `media_type` overrides the extension-derived type when given.
///
/// # Errors
/// Returns `IoError` if the file cannot be read.
pub async fn read_candidate(
    path: &Path,
    media_type: Option<&str>,
) -> SigningResult<CandidateFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SigningError::IoError(format!("Failed to read {}: {e}", path.display())))?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.pdf")
        .to_string();
    let media_type = media_type.unwrap_or_else(|| media_type_for_path(path));

    log::debug!(
        "Read {} ({} bytes, {media_type})",
        path.display(),
        bytes.len()
    );
    Ok(CandidateFile::new(file_name, media_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_media_type_for_path() {
        assert_eq!(media_type_for_path(Path::new("contract.pdf")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for_path(Path::new("SCAN.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(
            media_type_for_path(Path::new("notes.txt")),
            OCTET_STREAM_MEDIA_TYPE
        );
        assert_eq!(media_type_for_path(Path::new("pdf")), OCTET_STREAM_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_read_candidate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();

        let candidate = read_candidate(&path, None).await.unwrap();
        assert_eq!(candidate.file_name, "invoice.pdf");
        assert!(candidate.is_pdf());
        assert_eq!(candidate.bytes, b"%PDF-1.7\n");

        let overridden = read_candidate(&path, Some("text/plain")).await.unwrap();
        assert!(!overridden.is_pdf());
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_candidate(&dir.path().join("missing.pdf"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SigningError::IoError(_)));
    }
}
