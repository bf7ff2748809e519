//! Local file handling around the signing workflow.

pub mod document_loader;
pub mod download;

pub use document_loader::{media_type_for_path, read_candidate};
pub use download::{DownloadTarget, FileNaming, SignOutcome};
