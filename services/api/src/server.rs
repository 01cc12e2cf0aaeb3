use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_advisory_routes;
use agri_advisor::advisory::AdvisoryService;
use agri_advisor::config::AppConfig;
use agri_advisor::error::AppError;
use agri_advisor::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let advisory_service = Arc::new(AdvisoryService::from_config(&config.engine));

    let app = with_advisory_routes(advisory_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = config.engine.concurrency.as_str(),
        latency_ms = config.engine.inference_latency.as_millis() as u64,
        "agri advisor ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
