use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use premium_estimator::auth::Authenticator;
use premium_estimator::config::AppConfig;
use premium_estimator::error::AppError;
use premium_estimator::gateway::{premium_router, GatewayState, PremiumService};
use premium_estimator::storage::{Backend, StorageHandle};
use premium_estimator::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
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

    let store = Arc::new(StorageHandle::new(Backend::from_config(&config.storage)));
    if store.connect().is_err() {
        warn!("{}", storage_outage_notice(config.auth.degraded_mode));
    }
    if config.auth.degraded_mode {
        warn!("degraded identity mode enabled, token claims are trusted while the identity store is down");
    }

    let auth = Arc::new(Authenticator::from_config(store.clone(), &config.auth));
    let predictions = Arc::new(PremiumService::new(store.clone()));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        auth: auth.clone(),
    };

    let gateway = premium_router(GatewayState { predictions, auth });
    let app = with_service_routes(gateway, config.environment)
        .layer(Extension(app_state))
        .layer(CorsLayer::permissive())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        storage = store.backend_label(),
        "premium estimator ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.disconnect();
    Ok(())
}

fn storage_outage_notice(degraded_mode: bool) -> &'static str {
    if degraded_mode {
        "starting without storage, predictions will be scored but not saved"
    } else {
        "starting without storage, authenticated routes return 503 until it reconnects \
         (set AUTH_DEGRADED_MODE=true to keep scoring)"
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outage_notice_matches_identity_mode() {
        assert!(storage_outage_notice(true).contains("scored but not saved"));

        let strict = storage_outage_notice(false);
        assert!(strict.contains("return 503"));
        assert!(!strict.contains("scored but not saved"));
    }
}
