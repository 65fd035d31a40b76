use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredStore};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tourney::config::AppConfig;
use tourney::error::AppError;
use tourney::{bootstrap, telemetry, AppServices};
use tracing::info;

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

    let store = Arc::new(ConfiguredStore::open(config.storage.data_dir.as_deref())?);
    bootstrap(store.clone(), config.storage.seed_demo_identities)?;
    let services = AppServices::new(store);

    let app = with_operational_routes(services.router())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tournament desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
