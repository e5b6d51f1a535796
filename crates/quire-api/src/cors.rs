//! Cross-origin access for browser clients.
//!
//! A `*` entry opens the API to every origin; otherwise only the listed
//! origins are echoed back. Credentials are never allowed, so the identity
//! headers must be sent explicitly.

use axum::http::{HeaderName, HeaderValue, Method, header};
use quire_core::extract::{ORG_ID_HEADER, USER_ID_HEADER};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origin pattern that allows any origin.
pub const ANY_ORIGIN: &str = "*";

/// Build the CORS layer for `allowed_origins`.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
  let origin = if allowed_origins.iter().any(|o| o == ANY_ORIGIN) {
    AllowOrigin::any()
  } else {
    let mut parsed = Vec::new();
    for origin in allowed_origins {
      match HeaderValue::from_str(origin) {
        Ok(value) => parsed.push(value),
        Err(err) => tracing::warn!("ignoring invalid CORS origin '{origin}': {err}"),
      }
    }
    AllowOrigin::list(parsed)
  };

  CorsLayer::new()
    .allow_origin(origin)
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([
      header::CONTENT_TYPE,
      header::IF_NONE_MATCH,
      HeaderName::from_static(ORG_ID_HEADER),
      HeaderName::from_static(USER_ID_HEADER),
    ])
    .expose_headers([header::ETAG])
}
