use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use premium_estimator::config::AppEnvironment;
use premium_estimator::error::AppError;
use serde_json::json;

/// Add probes, metrics, and (in development only) the token helper to the API router.
pub(crate) fn with_service_routes(router: Router, environment: AppEnvironment) -> Router {
    let router = router
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint));

    if environment.is_development() {
        router.route("/api/dev/create-token", post(development_token_endpoint))
    } else {
        router
    }
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "Health Insurance API is running",
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn development_token_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = state.auth.issue_development_token()?;
    Ok(Json(json!({
        "success": true,
        "token": session.token,
        "user": session.user,
        "message": "Development token created",
    })))
}
