use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Notify;

use skirnir::workflows::assessment::{
    AssessmentReport, Category, GalleryKind, ScoringEngine, Selection,
};
use skirnir::workflows::upload::{
    BlobTransport, ContainerLister, CredentialIssuer, OrchestratorError, StorageError,
    UploadCredential, UploadOrchestrator, UploadOutcome, UploadPhase,
};

struct FakeIssuer {
    calls: AtomicUsize,
    deny_with: Option<String>,
    expire_immediately: bool,
}

impl FakeIssuer {
    fn granting() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            deny_with: None,
            expire_immediately: false,
        }
    }

    fn denying(reason: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            deny_with: Some(reason.into()),
            expire_immediately: false,
        }
    }

    fn expiring_immediately() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            deny_with: None,
            expire_immediately: true,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn issue_write_credential(
        &self,
        object_name: &str,
        container: &str,
        duration_minutes: u32,
    ) -> Result<UploadCredential, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.deny_with {
            return Err(StorageError::CredentialRequest(reason.clone()));
        }
        let expires_at = if self.expire_immediately {
            Utc::now() - Duration::minutes(1)
        } else {
            Utc::now() + Duration::minutes(i64::from(duration_minutes))
        };
        Ok(UploadCredential {
            url: format!("memory://{container}/{object_name}"),
            object_name: object_name.to_string(),
            container: container.to_string(),
            expires_at,
        })
    }
}

#[derive(Default)]
struct RecordingTransport {
    calls: AtomicUsize,
    writes: Mutex<Vec<(String, Vec<u8>)>>,
    fail_with: Option<String>,
}

impl RecordingTransport {
    fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.writes.lock().expect("writes mutex poisoned").clone()
    }
}

#[async_trait]
impl BlobTransport for RecordingTransport {
    async fn put(&self, credential: &UploadCredential, bytes: &[u8]) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_with {
            return Err(StorageError::UploadTransport(reason.clone()));
        }
        self.writes
            .lock()
            .expect("writes mutex poisoned")
            .push((credential.object_name.clone(), bytes.to_vec()));
        Ok(())
    }
}

/// Transport that parks inside `put` until released, so a test can observe
/// the orchestrator mid-flight.
struct BlockingTransport {
    started: Arc<Notify>,
    release: Arc<Notify>,
    calls: AtomicUsize,
}

impl BlockingTransport {
    fn new() -> (Self, Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        (
            Self {
                started: started.clone(),
                release: release.clone(),
                calls: AtomicUsize::new(0),
            },
            started,
            release,
        )
    }
}

#[async_trait]
impl BlobTransport for BlockingTransport {
    async fn put(&self, _credential: &UploadCredential, _bytes: &[u8]) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

struct ScriptedLister {
    responses: Mutex<VecDeque<Result<Vec<String>, String>>>,
    calls: AtomicUsize,
}

impl ScriptedLister {
    fn new(responses: impl IntoIterator<Item = Result<Vec<String>, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    fn listing(names: &[&str]) -> Self {
        Self::new([Ok(names.iter().map(|name| name.to_string()).collect())])
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContainerLister for ScriptedLister {
    async fn list(&self, _container: &str) -> Result<Vec<String>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self
            .responses
            .lock()
            .expect("responses mutex poisoned")
            .pop_front()
        {
            Some(Ok(names)) => Ok(names),
            Some(Err(reason)) => Err(StorageError::List(reason)),
            None => Ok(Vec::new()),
        }
    }
}

fn orchestrator<I, T, L>(
    issuer: Arc<I>,
    transport: Arc<T>,
    lister: Arc<L>,
) -> UploadOrchestrator<I, T, L>
where
    I: CredentialIssuer,
    T: BlobTransport,
    L: ContainerLister,
{
    UploadOrchestrator::new(issuer, transport, lister, "upload", 5)
}

#[tokio::test]
async fn successful_chain_uploads_and_refreshes_the_gallery() {
    let issuer = Arc::new(FakeIssuer::granting());
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&["a.png", "b.csv"]));
    let orchestrator = orchestrator(issuer.clone(), transport.clone(), lister.clone());

    orchestrator
        .stage("scan.png", b"image bytes".to_vec())
        .expect("staging accepted while idle");
    assert_eq!(orchestrator.phase(), UploadPhase::FileSelected);

    let outcome = orchestrator.upload().await.expect("trigger accepted");
    assert_eq!(outcome, UploadOutcome::Success);
    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
    assert_eq!(issuer.call_count(), 1);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(lister.call_count(), 1);

    let writes = transport.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "scan.png");
    assert_eq!(writes[0].1, b"image bytes");

    let gallery = orchestrator.gallery();
    assert_eq!(gallery.len(), 2);
    assert_eq!(gallery[0].name, "a.png");
    assert_eq!(gallery[0].kind, GalleryKind::Image);
    assert_eq!(gallery[1].name, "b.csv");
    assert_eq!(gallery[1].kind, GalleryKind::Csv);
}

#[tokio::test]
async fn denied_credential_short_circuits_before_the_transport() {
    let issuer = Arc::new(FakeIssuer::denying("403 Forbidden"));
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&[]));
    let orchestrator = orchestrator(issuer.clone(), transport.clone(), lister.clone());

    orchestrator
        .stage("report.csv", b"Category,Selected Option,Score\n".to_vec())
        .expect("staging accepted");
    let outcome = orchestrator.upload().await.expect("trigger accepted");

    match outcome {
        UploadOutcome::Failure(reason) => assert!(reason.contains("403")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(lister.call_count(), 0);
}

#[tokio::test]
async fn empty_payload_fails_without_any_network_call() {
    let issuer = Arc::new(FakeIssuer::granting());
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&[]));
    let orchestrator = orchestrator(issuer.clone(), transport.clone(), lister.clone());

    orchestrator
        .stage("empty.csv", Vec::new())
        .expect("staging accepted");
    let outcome = orchestrator.upload().await.expect("trigger accepted");

    assert_eq!(outcome, UploadOutcome::Failure("empty file".to_string()));
    assert_eq!(issuer.call_count(), 0);
    assert_eq!(transport.call_count(), 0);
    assert_eq!(lister.call_count(), 0);
}

#[tokio::test]
async fn expired_credential_is_not_presented_to_the_transport() {
    let issuer = Arc::new(FakeIssuer::expiring_immediately());
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&[]));
    let orchestrator = orchestrator(issuer.clone(), transport.clone(), lister.clone());

    orchestrator
        .stage("late.csv", b"rows".to_vec())
        .expect("staging accepted");
    let outcome = orchestrator.upload().await.expect("trigger accepted");

    match outcome {
        UploadOutcome::Failure(reason) => assert!(reason.contains("expired")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn failed_transport_skips_the_gallery_refresh() {
    let issuer = Arc::new(FakeIssuer::granting());
    let transport = Arc::new(RecordingTransport::failing("connection reset"));
    let lister = Arc::new(ScriptedLister::listing(&["stale.png"]));
    let orchestrator = orchestrator(issuer.clone(), transport.clone(), lister.clone());

    orchestrator
        .stage("scan.png", b"image bytes".to_vec())
        .expect("staging accepted");
    let outcome = orchestrator.upload().await.expect("trigger accepted");

    match outcome {
        UploadOutcome::Failure(reason) => assert!(reason.contains("connection reset")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(lister.call_count(), 0);
    assert!(orchestrator.gallery().is_empty());
}

#[tokio::test]
async fn listing_failure_after_upload_keeps_the_last_known_gallery() {
    let issuer = Arc::new(FakeIssuer::granting());
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::new([
        Ok(vec!["seed.png".to_string()]),
        Err("backend unavailable".to_string()),
    ]));
    let orchestrator = orchestrator(issuer.clone(), transport.clone(), lister.clone());

    orchestrator
        .refresh_gallery()
        .await
        .expect("initial listing succeeds");
    assert_eq!(orchestrator.gallery().len(), 1);

    orchestrator
        .stage("next.csv", b"rows".to_vec())
        .expect("staging accepted");
    let outcome = orchestrator.upload().await.expect("trigger accepted");

    match outcome {
        UploadOutcome::Failure(reason) => assert!(reason.contains("backend unavailable")),
        other => panic!("expected failure, got {other:?}"),
    }
    // The write itself happened; only the refresh failed, and the display
    // still shows the pre-upload listing.
    assert_eq!(transport.call_count(), 1);
    let gallery = orchestrator.gallery();
    assert_eq!(gallery.len(), 1);
    assert_eq!(gallery[0].name, "seed.png");
}

#[tokio::test]
async fn second_trigger_while_uploading_is_rejected() {
    let issuer = Arc::new(FakeIssuer::granting());
    let (transport, started, release) = BlockingTransport::new();
    let transport = Arc::new(transport);
    let lister = Arc::new(ScriptedLister::listing(&[]));
    let orchestrator = Arc::new(orchestrator(issuer.clone(), transport.clone(), lister));

    orchestrator
        .stage("slow.png", b"bytes".to_vec())
        .expect("staging accepted");

    let in_flight = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.upload().await })
    };
    started.notified().await;
    assert_eq!(orchestrator.phase(), UploadPhase::Uploading);

    assert!(matches!(
        orchestrator.upload().await,
        Err(OrchestratorError::Busy)
    ));
    assert!(matches!(
        orchestrator.stage("other.png", b"more".to_vec()),
        Err(OrchestratorError::Busy)
    ));
    // The rejected trigger never reached the backend.
    assert_eq!(issuer.call_count(), 1);

    release.notify_one();
    let outcome = in_flight
        .await
        .expect("upload task joins")
        .expect("trigger accepted");
    assert_eq!(outcome, UploadOutcome::Success);
    assert_eq!(orchestrator.phase(), UploadPhase::Idle);
}

#[tokio::test]
async fn trigger_without_a_staged_payload_is_rejected() {
    let issuer = Arc::new(FakeIssuer::granting());
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&[]));
    let orchestrator = orchestrator(issuer.clone(), transport, lister);

    assert!(matches!(
        orchestrator.upload().await,
        Err(OrchestratorError::NothingStaged)
    ));
    assert_eq!(issuer.call_count(), 0);
}

#[tokio::test]
async fn staging_clears_the_previous_outcome() {
    let issuer = Arc::new(FakeIssuer::denying("403 Forbidden"));
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&[]));
    let orchestrator = orchestrator(issuer, transport, lister);

    orchestrator
        .stage("first.csv", b"rows".to_vec())
        .expect("staging accepted");
    orchestrator.upload().await.expect("trigger accepted");
    assert!(orchestrator.last_outcome().is_some());

    orchestrator
        .stage("second.csv", b"rows".to_vec())
        .expect("restaging accepted");
    assert!(orchestrator.last_outcome().is_none());
    assert_eq!(orchestrator.staged_filename(), Some("second.csv".to_string()));
}

#[tokio::test]
async fn generated_report_is_just_another_payload() {
    let engine = ScoringEngine::standard().expect("standard table is valid");
    let mut selection = Selection::new();
    selection.choose(Category::SensoryPerception, "No Impairment");
    selection.choose(Category::Moisture, "Rarely moist");

    let report = AssessmentReport::generate(&engine, &selection, Utc::now())
        .expect("report generates");

    let issuer = Arc::new(FakeIssuer::granting());
    let transport = Arc::new(RecordingTransport::default());
    let lister = Arc::new(ScriptedLister::listing(&["a.png"]));
    let orchestrator = orchestrator(issuer, transport.clone(), lister);

    orchestrator
        .stage(report.filename.clone(), report.csv.clone().into_bytes())
        .expect("staging accepted");
    let outcome = orchestrator.upload().await.expect("trigger accepted");

    assert_eq!(outcome, UploadOutcome::Success);
    let writes = transport.writes();
    assert_eq!(writes[0].0, report.filename);
    assert_eq!(
        writes[0].1,
        b"Category,Selected Option,Score\nSensoryPerception,No Impairment,4\nMoisture,Rarely moist,4\n".to_vec()
    );
}
