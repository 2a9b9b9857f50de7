use async_trait::async_trait;

use super::credential::UploadCredential;

/// Failures raised by the storage-facing collaborators.
///
/// Network-origin variants are surfaced to the user as a short status
/// message and otherwise swallowed; none of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("credential request failed: {0}")]
    CredentialRequest(String),
    #[error("credential request rejected: {0}")]
    InvalidCredentialRequest(String),
    #[error("empty file")]
    EmptyPayload,
    #[error("credential for '{object_name}' has expired")]
    CredentialExpired { object_name: String },
    #[error("upload transport failed: {0}")]
    UploadTransport(String),
    #[error("gallery listing failed: {0}")]
    List(String),
}

/// Issues a short-lived delegated write credential for one object name.
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    /// One request, no retries. `object_name` and `container` must be
    /// non-empty and `duration_minutes` positive.
    async fn issue_write_credential(
        &self,
        object_name: &str,
        container: &str,
        duration_minutes: u32,
    ) -> Result<UploadCredential, StorageError>;
}

/// Writes one full payload to the location a credential names.
///
/// Exactly one write per call: no chunking, no resume. Implementations may
/// log byte counts for observability, but nothing reads progress back into
/// control flow.
#[async_trait]
pub trait BlobTransport: Send + Sync {
    async fn put(&self, credential: &UploadCredential, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Lists the object names currently in a container, in backend order.
#[async_trait]
pub trait ContainerLister: Send + Sync {
    async fn list(&self, container: &str) -> Result<Vec<String>, StorageError>;
}
