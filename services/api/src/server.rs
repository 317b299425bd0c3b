use crate::cli::ServeArgs;
use crate::infra::{captcha_verifier, open_store, seed_defaults, AppState};
use crate::routes::with_portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use teachteam::config::AppConfig;
use teachteam::error::AppError;
use teachteam::telemetry;
use teachteam::workflows::accounts::AccountService;
use teachteam::workflows::applicants::ApplicantService;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.storage.data_dir = Some(data_dir);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = open_store(&config.storage)?;
    let accounts = Arc::new(AccountService::new(
        store.clone(),
        Arc::new(captcha_verifier(&config)),
    ));
    let applicants = Arc::new(ApplicantService::new(store));
    seed_defaults(&accounts, &applicants)?;

    let app = with_portal_routes(accounts, applicants)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "teachteam portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}
