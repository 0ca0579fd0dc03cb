use crate::cli::ServeArgs;
use crate::infra::{AppState, JsonFileSnapshotStore};
use crate::routes::with_allocation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use housing_allocation::config::AppConfig;
use housing_allocation::error::AppError;
use housing_allocation::telemetry;
use housing_allocation::workflows::allocation::{AllocationEngine, AllocationService};
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

    let store = args.snapshot.take().map(JsonFileSnapshotStore::new);
    let service = match &store {
        Some(store) => {
            info!(path = %store.path().display(), "loading allocation snapshot");
            AllocationService::from_store(&config.allocation, store)?
        }
        None => AllocationService::new(AllocationEngine::new(&config.allocation)),
    };
    let service = Arc::new(service);

    let app = with_allocation_routes(service.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "housing allocation service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(store) = &store {
        service.persist(store)?;
        info!(path = %store.path().display(), "allocation snapshot saved");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "shutdown signal unavailable, serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
