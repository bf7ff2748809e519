//! Writing the signed document where the user expects it.

use crate::domain::constants::{DEFAULT_SIGNED_FILE_NAME, DERIVED_NAME_SUFFIX};
use crate::domain::document::SignedDocument;
use crate::infra::error::{SigningError, SigningResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// How the output file is named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNaming {
    /// Always the same name, `signed-document.pdf` by default.
    Fixed(String),
    /// `<source stem>-signed.pdf`.
    DerivedFromSource,
}

impl Default for FileNaming {
    fn default() -> Self {
        FileNaming::Fixed(DEFAULT_SIGNED_FILE_NAME.to_string())
    }
}

/// Where a finished signature was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOutcome {
    pub path: PathBuf,
    pub size: usize,
    /// Hex SHA-256 of the written file.
    pub sha256: String,
}

/// Destination of signed documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    directory: PathBuf,
    naming: FileNaming,
}

impl DownloadTarget {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, naming: FileNaming) -> Self {
        Self {
            directory: directory.into(),
            naming,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Output file name for a given source document name.
    #[must_use]
    pub fn file_name_for(&self, source_name: &str) -> String {
        match &self.naming {
            FileNaming::Fixed(name) => name.clone(),
            FileNaming::DerivedFromSource => {
                let stem = Path::new(source_name)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .filter(|s| !s.is_empty())
                    .unwrap_or("document");
                format!("{stem}{DERIVED_NAME_SUFFIX}.pdf")
            }
        }
    }

    /// Write the signed document and return where it went.
    ///
    /// # Errors
    /// Returns `IoError` if the directory cannot be created or the file
    /// cannot be written.
    pub async fn save(
        &self,
        source_name: &str,
        document: &SignedDocument,
    ) -> SigningResult<SignOutcome> {
        tokio::fs::create_dir_all(&self.directory).await.map_err(|e| {
            SigningError::IoError(format!(
                "Failed to create download directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let path = self.directory.join(self.file_name_for(source_name));
        tokio::fs::write(&path, document.as_bytes())
            .await
            .map_err(|e| SigningError::IoError(format!("Failed to write {}: {e}", path.display())))?;

        let sha256 = hex::encode(Sha256::digest(document.as_bytes()));
        log::info!(
            "Signed document written to {} ({} bytes, sha256 {sha256})",
            path.display(),
            document.len()
        );

        Ok(SignOutcome {
            path,
            size: document.len(),
            sha256,
        })
    }
}

impl Default for DownloadTarget {
    fn default() -> Self {
        Self::new(".", FileNaming::default())
    }
}
