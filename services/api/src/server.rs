use crate::cli::ServeArgs;
use crate::infra::{demo_store, AppState};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use clinic_waitlist::config::AppConfig;
use clinic_waitlist::error::AppError;
use clinic_waitlist::telemetry;
use clinic_waitlist::workflows::waitlist::{InMemoryClinicStore, WaitlistMatchingService};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = if config.seed_demo_data {
        Arc::new(demo_store(Utc::now(), config.matching.clinic_offset))
    } else {
        Arc::new(InMemoryClinicStore::new())
    };
    let matching_service = Arc::new(WaitlistMatchingService::new(
        store.clone(),
        store,
        config.matching.clone(),
    ));

    let app = with_matching_routes(matching_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        seeded = config.seed_demo_data,
        "waitlist matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
