//! PDF Remote Signer Library
//!
//! Client side of a two-phase remote PDF signing protocol. The user's
//! certificate and private key stay with a local signing agent; the backend
//! prepares the document (`start`), the agent signs the value the backend
//! asks for, and the backend injects that signature (`complete`).
//!
//! ```no_run
//! use pdf_remote_signer::{
//!     AgentConfig, ApiBaseUrl, CandidateFile, LocalAgentProvider, RemoteSigningClient,
//!     RemoteSigningConfig, SigningWorkflow, Thumbprint, WorkflowOptions,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> pdf_remote_signer::SigningResult<()> {
//! let agent = LocalAgentProvider::new(AgentConfig::new(ApiBaseUrl::new("http://127.0.0.1:8443")?))?;
//! let remote = RemoteSigningClient::new(RemoteSigningConfig::new(ApiBaseUrl::new(
//!     "https://sign.example.com/api",
//! )?))?;
//!
//! let mut workflow =
//!     SigningWorkflow::new(Arc::new(agent), Arc::new(remote), WorkflowOptions::default());
//! workflow.initialize().await?;
//! workflow.select_file(CandidateFile::new(
//!     "contract.pdf",
//!     "application/pdf",
//!     std::fs::read("contract.pdf")?,
//! ))?;
//! workflow.select_identity(&Thumbprint::new("5F1C0A")?)?;
//! let outcome = workflow.sign_document().await?;
//! println!("signed: {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use adapters::agent::{AgentConfig, LocalAgentProvider};
pub use adapters::provider::CertificateProvider;
pub use adapters::remote::{RemoteSigningApi, RemoteSigningClient, RemoteSigningConfig};
pub use domain::document::{CandidateFile, PreparedDocument, SelectedDocument, SignedDocument};
pub use domain::identity::{SigningIdentity, SubjectIdentifiers};
pub use domain::types::{ApiBaseUrl, DigestAlgorithm, Thumbprint};
pub use infra::config::{ClientConfiguration, ConfigManager, ExportFormat};
pub use infra::error::{SigningError, SigningResult};
pub use infra::progress::{ProgressFactory, ProgressReporter, ProgressStyle};
pub use pipelines::sign::{SigningWorkflow, WorkflowOptions, WorkflowPhase, WorkflowState};
pub use services::download::{DownloadTarget, FileNaming, SignOutcome};
