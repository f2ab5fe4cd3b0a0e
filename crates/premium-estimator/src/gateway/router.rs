use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::Serialize;

use super::error::GatewayError;
use super::service::{PredictionOutcome, PremiumService};
use crate::analytics::DashboardSummary;
use crate::auth::{AuthSession, Authenticator, Credentials, Identity, Registration, UserProfile};
use crate::estimation::{PredictionInput, PredictionKind, PremiumComponent, RawPredictionRequest};
use crate::storage::{IdentityStore, PredictionRecord, PredictionRepository, RecordId};

/// Shared handles for the premium endpoints.
pub struct GatewayState<R, U> {
    pub predictions: Arc<PremiumService<R>>,
    pub auth: Arc<Authenticator<U>>,
}

impl<R, U> Clone for GatewayState<R, U> {
    fn clone(&self) -> Self {
        Self {
            predictions: Arc::clone(&self.predictions),
            auth: Arc::clone(&self.auth),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub success: bool,
    pub premium: i64,
    pub normalized_input: PredictionInput,
    pub breakdown: Vec<PremiumComponent>,
    pub health_score: u32,
    pub kind: PredictionKind,
    pub record_id: Option<RecordId>,
}

impl From<PredictionOutcome> for PredictResponse {
    fn from(outcome: PredictionOutcome) -> Self {
        Self {
            success: true,
            premium: outcome.premium(),
            normalized_input: outcome.input,
            breakdown: outcome.estimate.components,
            health_score: outcome.health_score,
            kind: outcome.kind,
            record_id: outcome.record_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub predictions: Vec<PredictionRecord>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub data: DashboardSummary,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserProfile,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            success: true,
            token: session.token,
            user: session.user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Router exposing prediction, history, dashboard, and account endpoints.
pub fn premium_router<R, U>(state: GatewayState<R, U>) -> Router
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    Router::new()
        .route("/api/predict", post(predict_handler::<R, U>))
        .route("/api/predictions", get(history_handler::<R, U>))
        .route("/api/dashboard", get(dashboard_handler::<R, U>))
        .route("/api/auth/register", post(register_handler::<R, U>))
        .route("/api/auth/login", post(login_handler::<R, U>))
        .route("/api/auth/profile", get(profile_handler::<R, U>))
        .with_state(state)
}

fn identify<U: IdentityStore>(
    auth: &Authenticator<U>,
    headers: &HeaderMap,
) -> Result<Identity, GatewayError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    Ok(auth.authenticate(header)?)
}

pub(crate) async fn predict_handler<R, U>(
    State(state): State<GatewayState<R, U>>,
    request: Request,
) -> Result<Response, GatewayError>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    let identity = identify(&state.auth, request.headers())?;
    let payload = read_prediction_request(request).await?;
    let outcome = state.predictions.predict(&identity.owner_id, &payload)?;
    Ok((StatusCode::OK, axum::Json(PredictResponse::from(outcome))).into_response())
}

/// Decode a JSON or urlencoded form body. Called only after the caller is identified.
async fn read_prediction_request(request: Request) -> Result<RawPredictionRequest, GatewayError> {
    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(payload) = Form::<RawPredictionRequest>::from_request(request, &())
            .await
            .map_err(|rejection| GatewayError::MalformedBody(rejection.body_text()))?;
        Ok(payload)
    } else {
        let Json(payload) = Json::<RawPredictionRequest>::from_request(request, &())
            .await
            .map_err(|rejection| GatewayError::MalformedBody(rejection.body_text()))?;
        Ok(payload)
    }
}

pub(crate) async fn history_handler<R, U>(
    State(state): State<GatewayState<R, U>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    let identity = identify(&state.auth, &headers)?;
    let predictions = state.predictions.history(&identity.owner_id)?;
    let payload = HistoryResponse {
        success: true,
        predictions,
    };
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}

pub(crate) async fn dashboard_handler<R, U>(
    State(state): State<GatewayState<R, U>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    let identity = identify(&state.auth, &headers)?;
    let data = state.predictions.dashboard(&identity.owner_id, Utc::now())?;
    let payload = DashboardResponse {
        success: true,
        data,
    };
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}

pub(crate) async fn register_handler<R, U>(
    State(state): State<GatewayState<R, U>>,
    axum::Json(registration): axum::Json<Registration>,
) -> Result<Response, GatewayError>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    let session = state.auth.register(registration)?;
    Ok((StatusCode::CREATED, axum::Json(AuthResponse::from(session))).into_response())
}

pub(crate) async fn login_handler<R, U>(
    State(state): State<GatewayState<R, U>>,
    axum::Json(credentials): axum::Json<Credentials>,
) -> Result<Response, GatewayError>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    let session = state.auth.login(credentials)?;
    Ok((StatusCode::OK, axum::Json(AuthResponse::from(session))).into_response())
}

pub(crate) async fn profile_handler<R, U>(
    State(state): State<GatewayState<R, U>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError>
where
    R: PredictionRepository + 'static,
    U: IdentityStore + 'static,
{
    let identity = identify(&state.auth, &headers)?;
    let user = state.auth.profile(&identity)?;
    let payload = ProfileResponse {
        success: true,
        user,
    };
    Ok((StatusCode::OK, axum::Json(payload)).into_response())
}
