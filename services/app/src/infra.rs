use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use skirnir::config::AppConfig;
use skirnir::workflows::assessment::Category;
use skirnir::workflows::upload::{
    BlobTransport, ContainerLister, CredentialIssuer, HttpBackendClient, HttpBlobTransport,
    StorageError, UploadCredential, UploadOrchestrator,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveOrchestrator =
    UploadOrchestrator<HttpBackendClient, HttpBlobTransport, HttpBackendClient>;

pub(crate) fn live_orchestrator(config: &AppConfig) -> Arc<LiveOrchestrator> {
    let backend = Arc::new(HttpBackendClient::from_config(&config.backend));
    let transport = Arc::new(HttpBlobTransport::new());
    Arc::new(UploadOrchestrator::new(
        Arc::clone(&backend),
        transport,
        backend,
        config.backend.container.clone(),
        config.backend.credential_minutes,
    ))
}

/// In-memory stand-in for the credential backend and the blob store, used
/// by the offline demo and the route tests.
#[derive(Default)]
pub(crate) struct InMemoryStorage {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
}

impl InMemoryStorage {
    pub(crate) fn seed(&self, name: impl Into<String>) {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .push((name.into(), Vec::new()));
    }
}

#[async_trait]
impl CredentialIssuer for InMemoryStorage {
    async fn issue_write_credential(
        &self,
        object_name: &str,
        container: &str,
        duration_minutes: u32,
    ) -> Result<UploadCredential, StorageError> {
        Ok(UploadCredential {
            url: format!("memory://{container}/{object_name}"),
            object_name: object_name.to_string(),
            container: container.to_string(),
            expires_at: Utc::now() + Duration::minutes(i64::from(duration_minutes)),
        })
    }
}

#[async_trait]
impl BlobTransport for InMemoryStorage {
    async fn put(&self, credential: &UploadCredential, bytes: &[u8]) -> Result<(), StorageError> {
        self.objects
            .lock()
            .expect("storage mutex poisoned")
            .push((credential.object_name.clone(), bytes.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl ContainerLister for InMemoryStorage {
    async fn list(&self, _container: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .objects
            .lock()
            .expect("storage mutex poisoned")
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }
}

/// Parse a `Category=Option` pair from the command line.
pub(crate) fn parse_choice(raw: &str) -> Result<(Category, String), String> {
    let (category, option) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Category=Option, got '{raw}'"))?;
    let category = Category::from_label(category.trim())
        .ok_or_else(|| format!("unknown category '{}'", category.trim()))?;
    let option = option.trim();
    if option.is_empty() {
        return Err(format!("no option given for {}", category.label()));
    }
    Ok((category, option.to_string()))
}
