//! `SigningWorkflow` orchestrates the prepare / sign / complete sequence.
//!
//! The workflow owns the user-facing state of one signing session: the
//! cached identity list, the current selections, the loading flag and the
//! last error. Every step is awaited in order; the output of each call is
//! the input of the next one.

use crate::adapters::provider::CertificateProvider;
use crate::adapters::remote::RemoteSigningApi;
use crate::domain::document::{CandidateFile, SelectedDocument};
use crate::domain::identity::{eligible_identities, SigningIdentity};
use crate::domain::types::{DigestAlgorithm, Thumbprint};
use crate::infra::error::{SigningError, SigningResult};
use crate::infra::progress::{NullProgress, ProgressReporter};
use crate::services::download::{DownloadTarget, SignOutcome};
use std::fmt;
use std::sync::Arc;

/// A document and an identity, both chosen. Nothing else can be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyToSign {
    pub document: SelectedDocument,
    pub identity: SigningIdentity,
}

/// Selections kept across a failed attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub document: Option<SelectedDocument>,
    pub identity: Option<SigningIdentity>,
}

impl Selection {
    fn into_ready(self) -> Result<ReadyToSign, Selection> {
        match self {
            Selection {
                document: Some(document),
                identity: Some(identity),
            } => Ok(ReadyToSign { document, identity }),
            incomplete => Err(incomplete),
        }
    }

    fn into_state(self) -> WorkflowState {
        match (self.document, self.identity) {
            (Some(document), Some(identity)) => {
                WorkflowState::CertificateSelected(ReadyToSign { document, identity })
            }
            (Some(document), None) => WorkflowState::FileSelected(document),
            (None, _) => WorkflowState::Idle,
        }
    }
}

impl From<ReadyToSign> for Selection {
    fn from(ready: ReadyToSign) -> Self {
        Self {
            document: Some(ready.document),
            identity: Some(ready.identity),
        }
    }
}

/// Where the workflow stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    FileSelected(SelectedDocument),
    CertificateSelected(ReadyToSign),
    /// Exporting the certificate and running `start`.
    Preparing(ReadyToSign),
    /// Waiting for the local agent's signature.
    Signing(ReadyToSign),
    /// Running `complete` and saving the result.
    Completing(ReadyToSign),
    Done(SignOutcome),
    /// Last attempt failed; selections are kept for a retry.
    Failed(Selection),
}

/// Field-less mirror of [`WorkflowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    FileSelected,
    CertificateSelected,
    Preparing,
    Signing,
    Completing,
    Done,
    Failed,
}

impl WorkflowState {
    #[must_use]
    pub fn phase(&self) -> WorkflowPhase {
        match self {
            WorkflowState::Idle => WorkflowPhase::Idle,
            WorkflowState::FileSelected(_) => WorkflowPhase::FileSelected,
            WorkflowState::CertificateSelected(_) => WorkflowPhase::CertificateSelected,
            WorkflowState::Preparing(_) => WorkflowPhase::Preparing,
            WorkflowState::Signing(_) => WorkflowPhase::Signing,
            WorkflowState::Completing(_) => WorkflowPhase::Completing,
            WorkflowState::Done(_) => WorkflowPhase::Done,
            WorkflowState::Failed(_) => WorkflowPhase::Failed,
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::FileSelected => "file selected",
            WorkflowPhase::CertificateSelected => "certificate selected",
            WorkflowPhase::Preparing => "preparing",
            WorkflowPhase::Signing => "signing",
            WorkflowPhase::Completing => "completing",
            WorkflowPhase::Done => "done",
            WorkflowPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Settings that stay fixed for the lifetime of a workflow.
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    pub digest_algorithm: DigestAlgorithm,
    pub download: DownloadTarget,
}

pub struct SigningWorkflow {
    provider: Arc<dyn CertificateProvider>,
    remote: Arc<dyn RemoteSigningApi>,
    options: WorkflowOptions,
    progress: Box<dyn ProgressReporter>,
    identities: Vec<SigningIdentity>,
    state: WorkflowState,
    last_error: Option<SigningError>,
}

impl SigningWorkflow {
    #[must_use]
    pub fn new(
        provider: Arc<dyn CertificateProvider>,
        remote: Arc<dyn RemoteSigningApi>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            provider,
            remote,
            options,
            progress: Box::new(NullProgress),
            identities: Vec::new(),
            state: WorkflowState::Idle,
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> WorkflowPhase {
        self.state.phase()
    }

    /// Eligible identities from the last successful `initialize`.
    #[must_use]
    pub fn identities(&self) -> &[SigningIdentity] {
        &self.identities
    }

    /// True while a signing attempt is between `start` and the download.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            WorkflowState::Preparing(_) | WorkflowState::Signing(_) | WorkflowState::Completing(_)
        )
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&SigningError> {
        self.last_error.as_ref()
    }

    /// User-facing text for the last error, without internal detail.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(SigningError::user_message)
    }

    #[must_use]
    pub fn selected_document(&self) -> Option<&SelectedDocument> {
        match &self.state {
            WorkflowState::FileSelected(document) => Some(document),
            WorkflowState::CertificateSelected(ready)
            | WorkflowState::Preparing(ready)
            | WorkflowState::Signing(ready)
            | WorkflowState::Completing(ready) => Some(&ready.document),
            WorkflowState::Failed(selection) => selection.document.as_ref(),
            WorkflowState::Idle | WorkflowState::Done(_) => None,
        }
    }

    #[must_use]
    pub fn selected_identity(&self) -> Option<&SigningIdentity> {
        match &self.state {
            WorkflowState::CertificateSelected(ready)
            | WorkflowState::Preparing(ready)
            | WorkflowState::Signing(ready)
            | WorkflowState::Completing(ready) => Some(&ready.identity),
            WorkflowState::Failed(selection) => selection.identity.as_ref(),
            WorkflowState::Idle | WorkflowState::FileSelected(_) | WorkflowState::Done(_) => None,
        }
    }

    /// Bring up the certificate provider and refresh the identity cache.
    ///
    /// The cache is replaced wholesale and holds only eligible identities.
    ///
    /// # Errors
    /// `ProviderUnavailable` when the agent cannot be reached; the cache is
    /// left empty.
    pub async fn initialize(&mut self) -> SigningResult<&[SigningIdentity]> {
        self.identities.clear();
        let provider = Arc::clone(&self.provider);

        let listed = match Self::load_identities(provider.as_ref()).await {
            Ok(listed) => listed,
            Err(e) => return Err(self.record_error(e)),
        };

        let total = listed.len();
        self.identities = eligible_identities(listed);
        log::info!(
            "Loaded {} eligible signing identities ({} listed)",
            self.identities.len(),
            total
        );
        Ok(&self.identities)
    }

    async fn load_identities(
        provider: &dyn CertificateProvider,
    ) -> SigningResult<Vec<SigningIdentity>> {
        provider.initialize().await?;
        provider.list_identities().await
    }

    /// Offer a file for signing.
    ///
    /// An existing identity selection survives a new file selection.
    ///
    /// # Errors
    /// `InvalidFile` when the file is not a PDF; the state is unchanged.
    pub fn select_file(&mut self, candidate: CandidateFile) -> SigningResult<()> {
        let document = match SelectedDocument::from_candidate(candidate) {
            Ok(document) => document,
            Err(e) => return Err(self.record_error(e)),
        };

        log::info!(
            "Selected {} ({} bytes)",
            document.file_name(),
            document.len()
        );
        let identity = self.take_selection().identity;
        self.state = Selection {
            document: Some(document),
            identity,
        }
        .into_state();
        self.last_error = None;
        Ok(())
    }

    /// Choose the identity to sign with, by thumbprint.
    ///
    /// # Errors
    /// `NotReady` when no document is selected yet, `IdentityNotFound`
    /// when the thumbprint is not among the eligible identities.
    pub fn select_identity(&mut self, thumbprint: &Thumbprint) -> SigningResult<()> {
        if self.selected_document().is_none() {
            return Err(self.record_error(SigningError::NotReady(
                "Select a PDF document before choosing a certificate".to_string(),
            )));
        }

        let Some(identity) = self
            .identities
            .iter()
            .find(|identity| identity.thumbprint() == thumbprint)
            .cloned()
        else {
            return Err(self.record_error(SigningError::IdentityNotFound(format!(
                "No eligible certificate with thumbprint {thumbprint}"
            ))));
        };

        log::info!("Selected certificate {}", identity.subject_name());
        let document = self.take_selection().document;
        self.state = Selection {
            document,
            identity: Some(identity),
        }
        .into_state();
        Ok(())
    }

    /// Run one signing attempt and write the signed document.
    ///
    /// Nothing is retried: on failure the workflow keeps its selections
    /// and a later call starts over from the certificate export.
    ///
    /// # Errors
    /// `NotReady` (without any provider or network call) when a document or
    /// identity is missing; otherwise the error of the step that failed.
    pub async fn sign_document(&mut self) -> SigningResult<SignOutcome> {
        let Some(ready) = self.take_ready() else {
            return Err(self.record_error(SigningError::NotReady(format!(
                "A PDF document and a certificate are required (state: {})",
                self.phase()
            ))));
        };

        self.last_error = None;
        log::info!(
            "Signing {} with {}",
            ready.document.file_name(),
            ready.identity.thumbprint()
        );
        self.state = WorkflowState::Preparing(ready);

        match self.run_phases().await {
            Ok(outcome) => {
                self.progress.finish();
                self.state = WorkflowState::Done(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                let selection = self.take_selection();
                self.state = WorkflowState::Failed(selection);
                self.progress.finish_with_error(e.user_message());
                Err(self.record_error(e))
            }
        }
    }

    async fn run_phases(&mut self) -> SigningResult<SignOutcome> {
        let provider = Arc::clone(&self.provider);
        let remote = Arc::clone(&self.remote);
        let digest_algorithm = self.options.digest_algorithm;

        self.progress.set_message("Reading certificate");
        let (thumbprint, prepared) = {
            let ready = self.in_flight()?;
            let thumbprint = ready.identity.thumbprint().clone();
            let certificate = provider.export_certificate(&thumbprint).await?;

            self.progress.set_message("Preparing document");
            let prepared = remote
                .start(&ready.document, &certificate, &thumbprint)
                .await?;
            (thumbprint, prepared)
        };

        let prepared_bytes = prepared.decode_document().map_err(|e| {
            SigningError::RemoteStartFailed(format!("Prepared document is not valid base64: {e}"))
        })?;
        log::debug!("Prepared document is {} bytes", prepared_bytes.len());

        self.advance(WorkflowState::Signing);
        self.progress.set_message("Waiting for signature");
        let signature = provider
            .sign(prepared.to_sign_hash(), &thumbprint, digest_algorithm)
            .await?;

        self.advance(WorkflowState::Completing);
        self.progress.set_message("Completing signature");
        let signed = remote.complete(&signature).await?;

        self.progress.set_message("Saving signed document");
        let source_name = self.in_flight()?.document.file_name().to_string();
        self.options.download.save(&source_name, &signed).await
    }

    /// Drop selections, cached errors and any finished result.
    pub fn reset(&mut self) {
        self.state = WorkflowState::Idle;
        self.last_error = None;
    }

    fn in_flight(&self) -> SigningResult<&ReadyToSign> {
        match &self.state {
            WorkflowState::Preparing(ready)
            | WorkflowState::Signing(ready)
            | WorkflowState::Completing(ready) => Ok(ready),
            other => Err(SigningError::NotReady(format!(
                "No signing attempt in flight (state: {})",
                other.phase()
            ))),
        }
    }

    /// Move the in-flight selection into the next phase.
    fn advance(&mut self, next: fn(ReadyToSign) -> WorkflowState) {
        self.state = match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::Preparing(ready)
            | WorkflowState::Signing(ready)
            | WorkflowState::Completing(ready) => next(ready),
            other => other,
        };
        log::debug!("Workflow phase: {}", self.phase());
    }

    fn take_selection(&mut self) -> Selection {
        match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::Idle | WorkflowState::Done(_) => Selection::default(),
            WorkflowState::FileSelected(document) => Selection {
                document: Some(document),
                identity: None,
            },
            WorkflowState::CertificateSelected(ready)
            | WorkflowState::Preparing(ready)
            | WorkflowState::Signing(ready)
            | WorkflowState::Completing(ready) => ready.into(),
            WorkflowState::Failed(selection) => selection,
        }
    }

    fn take_ready(&mut self) -> Option<ReadyToSign> {
        match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::CertificateSelected(ready) => Some(ready),
            WorkflowState::Failed(selection) => match selection.into_ready() {
                Ok(ready) => Some(ready),
                Err(selection) => {
                    self.state = WorkflowState::Failed(selection);
                    None
                }
            },
            other => {
                self.state = other;
                None
            }
        }
    }

    fn record_error(&mut self, error: SigningError) -> SigningError {
        log::error!("{error}");
        self.last_error = Some(error.clone());
        error
    }
}
