use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::BackendConfig;

use super::credential::UploadCredential;
use super::gateway::{BlobTransport, ContainerLister, CredentialIssuer, StorageError};

const WRITE_PERMISSION: &str = "w";

#[derive(Debug, Deserialize)]
struct SasResponse {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    list: Vec<String>,
}

/// REST client for the credential-issuing backend.
///
/// Two endpoints: `POST /api/sas` to mint a write credential and
/// `GET /api/list` to enumerate a container.
pub struct HttpBackendClient {
    http: Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CredentialIssuer for HttpBackendClient {
    async fn issue_write_credential(
        &self,
        object_name: &str,
        container: &str,
        duration_minutes: u32,
    ) -> Result<UploadCredential, StorageError> {
        if object_name.trim().is_empty() {
            return Err(StorageError::InvalidCredentialRequest(
                "object name must not be empty".to_string(),
            ));
        }
        if container.trim().is_empty() {
            return Err(StorageError::InvalidCredentialRequest(
                "container must not be empty".to_string(),
            ));
        }
        if duration_minutes == 0 {
            return Err(StorageError::InvalidCredentialRequest(
                "credential duration must be positive".to_string(),
            ));
        }

        let requested_at = Utc::now();
        let timerange = duration_minutes.to_string();
        let response = self
            .http
            .post(self.endpoint("/api/sas"))
            .query(&[
                ("file", object_name),
                ("permission", WRITE_PERMISSION),
                ("container", container),
                ("timerange", timerange.as_str()),
            ])
            .send()
            .await
            .map_err(|err| StorageError::CredentialRequest(err.to_string()))?
            .error_for_status()
            .map_err(|err| StorageError::CredentialRequest(err.to_string()))?;

        let body: SasResponse = response
            .json()
            .await
            .map_err(|err| StorageError::CredentialRequest(err.to_string()))?;

        debug!(object = object_name, container, minutes = duration_minutes, "write credential issued");

        Ok(UploadCredential {
            url: body.url,
            object_name: object_name.to_string(),
            container: container.to_string(),
            expires_at: requested_at + Duration::minutes(i64::from(duration_minutes)),
        })
    }
}

#[async_trait]
impl ContainerLister for HttpBackendClient {
    async fn list(&self, container: &str) -> Result<Vec<String>, StorageError> {
        let response = self
            .http
            .get(self.endpoint("/api/list"))
            .query(&[("container", container)])
            .send()
            .await
            .map_err(|err| StorageError::List(err.to_string()))?
            .error_for_status()
            .map_err(|err| StorageError::List(err.to_string()))?;

        let body: ListResponse = response
            .json()
            .await
            .map_err(|err| StorageError::List(err.to_string()))?;

        Ok(body.list)
    }
}

/// Single-shot blob writer against the URL a credential names.
pub struct HttpBlobTransport {
    http: Client,
}

impl HttpBlobTransport {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpBlobTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobTransport for HttpBlobTransport {
    async fn put(&self, credential: &UploadCredential, bytes: &[u8]) -> Result<(), StorageError> {
        debug!(
            object = %credential.object_name,
            bytes = bytes.len(),
            "starting blob write"
        );

        self.http
            .put(&credential.url)
            .header("x-ms-blob-type", "BlockBlob")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|err| StorageError::UploadTransport(err.to_string()))?
            .error_for_status()
            .map_err(|err| StorageError::UploadTransport(err.to_string()))?;

        debug!(object = %credential.object_name, bytes = bytes.len(), "blob write complete");
        Ok(())
    }
}
