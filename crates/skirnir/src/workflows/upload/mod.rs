//! Delegated-credential upload workflow: request a short-lived write
//! credential from the backend, push the payload to storage, refresh the
//! gallery listing.

pub mod credential;
pub mod gateway;
pub mod http;
pub mod orchestrator;

pub use credential::UploadCredential;
pub use gateway::{BlobTransport, ContainerLister, CredentialIssuer, StorageError};
pub use http::{HttpBackendClient, HttpBlobTransport};
pub use orchestrator::{
    OrchestratorError, StagedPayload, UploadOrchestrator, UploadOutcome, UploadPhase,
};
