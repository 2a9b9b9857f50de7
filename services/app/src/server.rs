use crate::cli::ServeArgs;
use crate::infra::{live_orchestrator, AppState};
use crate::routes::{with_workflow_routes, WorkflowFacade};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use skirnir::config::AppConfig;
use skirnir::error::AppError;
use skirnir::telemetry;
use skirnir::workflows::assessment::ScoringEngine;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(ScoringEngine::standard()?);
    let orchestrator = live_orchestrator(&config);

    // Warm the gallery once; a failed listing must not block startup.
    if let Err(err) = orchestrator.refresh_gallery().await {
        warn!(%err, "initial gallery refresh failed");
    }

    let app = with_workflow_routes(WorkflowFacade {
        engine,
        orchestrator,
    })
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, backend = %config.backend.base_url, "assessment upload service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
