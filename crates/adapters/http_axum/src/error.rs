//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use ipadha_domain::error::{IpadhaError, NotFoundError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`IpadhaError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(IpadhaError);

impl From<IpadhaError> for ApiError {
    fn from(err: IpadhaError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            IpadhaError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            IpadhaError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            IpadhaError::Unauthorized => {
                tracing::warn!("hub rejected the access token");
                (StatusCode::BAD_GATEWAY, self.0.to_string())
            }
            IpadhaError::Transport(err) => {
                tracing::warn!(error = %err, "hub request failed");
                (StatusCode::BAD_GATEWAY, format!("{}: {err}", self.0))
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
