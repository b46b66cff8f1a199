use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use super::dto::ErrorBody;
use crate::{
    control::{ControlError, WindowError},
    db::StoreError,
};

#[derive(Debug)]
pub enum AppError {
    /// The request was understood but its content is invalid.
    BadRequest(String),
    /// An upstream service (the sunset lookup) failed.
    BadGateway(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Internal(e) => {
                error!(error = %e, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ControlError> for AppError {
    fn from(e: ControlError) -> Self {
        match e {
            ControlError::Window(WindowError::Parse(e)) => Self::BadRequest(e.to_string()),
            ControlError::Window(WindowError::ExternalLookup(e)) => {
                warn!(error = %e, "Sunset lookup failed; settings left unchanged");
                Self::BadGateway(e.to_string())
            }
            ControlError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.into())
    }
}
