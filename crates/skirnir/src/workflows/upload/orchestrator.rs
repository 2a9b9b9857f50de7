use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{info, warn};

use crate::workflows::assessment::GalleryEntry;

use super::gateway::{BlobTransport, ContainerLister, CredentialIssuer, StorageError};

/// Where the single in-flight operation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    RequestingCredential,
    Uploading,
    Refreshing,
}

/// Outcome of the last completed operation. Transient display state only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success,
    Failure(String),
}

/// A payload staged for upload under its destination object name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPayload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("an upload is already in flight")]
    Busy,
    #[error("no file staged for upload")]
    NothingStaged,
}

struct OrchestratorState {
    phase: UploadPhase,
    staged: Option<StagedPayload>,
    outcome: Option<UploadOutcome>,
    gallery: Vec<GalleryEntry>,
}

/// Serializes the credential -> upload -> refresh chain and owns the
/// selection/progress/result state for it.
///
/// One operation at a time: a trigger while a step is running is rejected,
/// never queued, and there is no cancellation once the credential request
/// has started. Both the questionnaire-submit path and the manual
/// file-picker path stage their bytes here and share the same chain.
pub struct UploadOrchestrator<I, T, L> {
    issuer: Arc<I>,
    transport: Arc<T>,
    lister: Arc<L>,
    container: String,
    credential_minutes: u32,
    inner: Mutex<OrchestratorState>,
}

impl<I, T, L> UploadOrchestrator<I, T, L>
where
    I: CredentialIssuer,
    T: BlobTransport,
    L: ContainerLister,
{
    pub fn new(
        issuer: Arc<I>,
        transport: Arc<T>,
        lister: Arc<L>,
        container: impl Into<String>,
        credential_minutes: u32,
    ) -> Self {
        Self {
            issuer,
            transport,
            lister,
            container: container.into(),
            credential_minutes,
            inner: Mutex::new(OrchestratorState {
                phase: UploadPhase::Idle,
                staged: None,
                outcome: None,
                gallery: Vec::new(),
            }),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn phase(&self) -> UploadPhase {
        self.lock().phase
    }

    pub fn last_outcome(&self) -> Option<UploadOutcome> {
        self.lock().outcome.clone()
    }

    pub fn staged_filename(&self) -> Option<String> {
        self.lock()
            .staged
            .as_ref()
            .map(|payload| payload.filename.clone())
    }

    /// The last successfully fetched listing, in backend order.
    pub fn gallery(&self) -> Vec<GalleryEntry> {
        self.lock().gallery.clone()
    }

    /// Stage a payload, clearing any previous outcome. Rejected while an
    /// operation is in flight.
    pub fn stage(&self, filename: impl Into<String>, bytes: Vec<u8>) -> Result<(), OrchestratorError> {
        let mut state = self.lock();
        match state.phase {
            UploadPhase::Idle | UploadPhase::FileSelected => {
                state.staged = Some(StagedPayload {
                    filename: filename.into(),
                    bytes,
                });
                state.phase = UploadPhase::FileSelected;
                state.outcome = None;
                Ok(())
            }
            _ => Err(OrchestratorError::Busy),
        }
    }

    /// Run the staged payload through credential -> upload -> refresh.
    ///
    /// The first failing step short-circuits the chain; the orchestrator
    /// lands back in `Idle` either way, with the outcome recorded. A listing
    /// failure after a successful write is reported as a failure but keeps
    /// the last-known gallery on display.
    pub async fn upload(&self) -> Result<UploadOutcome, OrchestratorError> {
        let staged = {
            let mut state = self.lock();
            match state.phase {
                UploadPhase::FileSelected => match state.staged.take() {
                    Some(staged) => {
                        state.phase = UploadPhase::RequestingCredential;
                        state.outcome = None;
                        staged
                    }
                    None => return Err(OrchestratorError::NothingStaged),
                },
                UploadPhase::Idle => return Err(OrchestratorError::NothingStaged),
                _ => return Err(OrchestratorError::Busy),
            }
        };

        let outcome = self.run_chain(staged).await;

        let mut state = self.lock();
        state.phase = UploadPhase::Idle;
        state.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Fetch the current listing. On failure the last-known gallery stays
    /// in place so a listing hiccup never blanks the display.
    pub async fn refresh_gallery(&self) -> Result<Vec<GalleryEntry>, StorageError> {
        match self.lister.list(&self.container).await {
            Ok(names) => {
                let entries: Vec<GalleryEntry> =
                    names.into_iter().map(GalleryEntry::classify).collect();
                self.lock().gallery = entries.clone();
                Ok(entries)
            }
            Err(err) => {
                warn!(%err, container = %self.container, "gallery refresh failed; keeping last-known list");
                Err(err)
            }
        }
    }

    async fn run_chain(&self, staged: StagedPayload) -> UploadOutcome {
        if staged.bytes.is_empty() {
            warn!(object = %staged.filename, "refusing to upload an empty payload");
            return UploadOutcome::Failure(StorageError::EmptyPayload.to_string());
        }

        let credential = match self
            .issuer
            .issue_write_credential(&staged.filename, &self.container, self.credential_minutes)
            .await
        {
            Ok(credential) => credential,
            Err(err) => {
                warn!(%err, object = %staged.filename, "credential request failed");
                return UploadOutcome::Failure(err.to_string());
            }
        };

        self.set_phase(UploadPhase::Uploading);

        if credential.is_expired(Utc::now()) {
            let err = StorageError::CredentialExpired {
                object_name: credential.object_name.clone(),
            };
            warn!(%err, "credential expired before the write started");
            return UploadOutcome::Failure(err.to_string());
        }

        if let Err(err) = self.transport.put(&credential, &staged.bytes).await {
            warn!(%err, object = %staged.filename, "blob write failed");
            return UploadOutcome::Failure(err.to_string());
        }

        self.set_phase(UploadPhase::Refreshing);

        match self.refresh_gallery().await {
            Ok(_) => {
                info!(object = %staged.filename, "upload finished");
                UploadOutcome::Success
            }
            Err(err) => UploadOutcome::Failure(err.to_string()),
        }
    }

    fn set_phase(&self, phase: UploadPhase) {
        self.lock().phase = phase;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OrchestratorState> {
        self.inner.lock().expect("orchestrator mutex poisoned")
    }
}
