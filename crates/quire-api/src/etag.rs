//! Strong ETags for single-record reads.
//!
//! The tag is a SHA-256 hash of the exact JSON body sent, so it changes
//! whenever any serialized field does (including `updated_at`).

use axum::{
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// Compute the quoted ETag for `body`.
pub fn compute_etag(body: &[u8]) -> String {
  format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Whether an `If-None-Match` value matches `etag`.
///
/// Accepts a comma-separated list, `*`, weak (`W/`) entries, and tags sent
/// without their surrounding quotes.
pub fn if_none_match(header_value: &str, etag: &str) -> bool {
  let current = etag.trim_matches('"');
  header_value.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || candidate.trim_start_matches("W/").trim_matches('"') == current
  })
}

/// The raw `If-None-Match` header, if any.
pub fn if_none_match_header(headers: &HeaderMap) -> Option<String> {
  headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned)
}

/// Serialize `value` as a JSON response carrying an ETag, or `304 Not
/// Modified` if the client already holds it.
pub fn json_with_etag<T: Serialize>(
  if_none: Option<&str>,
  value: &T,
) -> Result<Response, ApiError> {
  let body = serde_json::to_vec(value)?;
  let etag = compute_etag(&body);

  if if_none.is_some_and(|v| if_none_match(v, &etag)) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  Ok(
    (
      [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (header::ETAG, etag),
      ],
      body,
    )
      .into_response(),
  )
}
