//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] aerosafe_core::Error),

  /// Missing or malformed identity headers.
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    use aerosafe_core::Error as Core;
    match self {
      ApiError::Core(Core::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Core(Core::InvalidTransition(_) | Core::Conflict(_)) => {
        StatusCode::CONFLICT
      }
      ApiError::Core(Core::NotFound { .. }) => StatusCode::NOT_FOUND,
      ApiError::Core(Core::DataIntegrity(_) | Core::Store(_)) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
