// Config errors abort construction; per-request problems only ever surface as outcomes.
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tower::BoxError;

/// Raised while building a strategy. Never produced per request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("invalid key material: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
}

/// Cause of an `AuthOutcome::Error`: identity resolution broke, as opposed to
/// the client presenting bad credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("identity resolver failed: {0}")]
    Resolver(#[source] BoxError),
    #[error("identity resolver panicked: {0}")]
    ResolverPanicked(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown authentication strategy: {0}")]
    UnknownStrategy(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// What the axum host sends back when authentication does not succeed.
#[derive(Debug, Error)]
pub enum AuthRejection {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("internal server error")]
    Internal,
}

impl AuthRejection {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthorized { message } => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
            }
            AuthRejection::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<RegistryError> for AuthRejection {
    fn from(_: RegistryError) -> Self {
        // A guard pointing at an unregistered scheme is a wiring bug, not a client error.
        AuthRejection::Internal
    }
}
