//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use quire_core::ErrorKind;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validate::Invalid;

/// Message shared by every identity resolution failure.
pub const UNRESOLVED_IDENTITY: &str = "identity could not be established";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] quire_core::Error),

  #[error(transparent)]
  Invalid(#[from] Invalid),

  /// The body or query string could not be decoded.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("encoding error: {0}")]
  Encode(#[from] serde_json::Error),
}

impl ApiError {
  fn parts(&self) -> (StatusCode, &'static str, String) {
    match self {
      ApiError::Core(e) => {
        let status = match e.kind() {
          ErrorKind::MalformedIdentity => StatusCode::UNAUTHORIZED,
          ErrorKind::UserNotFound
          | ErrorKind::OrganizationNotFound
          | ErrorKind::OrganizationMismatch => {
            return (
              StatusCode::UNAUTHORIZED,
              "identity_unresolved",
              UNRESOLVED_IDENTITY.to_string(),
            );
          }
          ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
          ErrorKind::NotFound => StatusCode::NOT_FOUND,
          ErrorKind::ConstraintViolation | ErrorKind::AlreadyProvisioned => StatusCode::CONFLICT,
          ErrorKind::Store => {
            return (
              StatusCode::INTERNAL_SERVER_ERROR,
              "internal",
              "internal server error".to_string(),
            );
          }
        };
        (status, e.kind().into(), e.to_string())
      }
      ApiError::Invalid(e) => (StatusCode::BAD_REQUEST, "validation", e.to_string()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", m.clone()),
      ApiError::Encode(_) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "internal server error".to_string(),
      ),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code, message) = self.parts();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": message, "code": code }))).into_response()
  }
}
