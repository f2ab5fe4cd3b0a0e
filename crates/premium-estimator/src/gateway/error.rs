use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use super::service::PredictionError;
use crate::auth::AuthError;
use crate::estimation::{ScorerError, ValidationError};
use crate::storage::RepositoryError;

/// Request failure rendered as `{"success": false, "error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Scorer(#[from] ScorerError),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl From<PredictionError> for GatewayError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::Validation(err) => GatewayError::Validation(err),
            PredictionError::Scorer(err) => GatewayError::Scorer(err),
        }
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) | GatewayError::MalformedBody(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Auth(err) => match err {
                AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::ExpiredToken
                | AuthError::UnknownUser
                | AuthError::Deactivated
                | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UsernameTaken => StatusCode::CONFLICT,
                AuthError::InvalidRegistration(_) => StatusCode::BAD_REQUEST,
                AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::Store(_) | AuthError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            GatewayError::Scorer(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Storage(RepositoryError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Storage(RepositoryError::Conflict) => StatusCode::CONFLICT,
            GatewayError::Storage(RepositoryError::Corrupt(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        let payload = json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, axum::Json(payload)).into_response()
    }
}
