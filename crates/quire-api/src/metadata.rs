//! Adapts HTTP headers to the pipeline's request metadata.

use axum::http::HeaderMap;
use quire_core::extract::RequestMetadata;

/// Header lookups are case-insensitive. A value that is not visible ASCII is
/// treated as absent.
pub struct HeaderMetadata<'a>(pub &'a HeaderMap);

impl RequestMetadata for HeaderMetadata<'_> {
  fn get(&self, name: &str) -> Option<&str> {
    self.0.get(name).and_then(|v| v.to_str().ok())
  }
}
