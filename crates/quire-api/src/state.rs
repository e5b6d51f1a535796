//! Shared state threaded through all handlers.

use std::sync::Arc;

use quire_core::pipeline::Pipeline;
use serde::Serialize;

/// Static facts about the running service, reported by the root and health
/// endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
  pub app_name:    String,
  pub version:     String,
  pub environment: String,
}

pub struct AppState<S> {
  pub pipeline: Pipeline<S>,
  pub info:     Arc<ServiceInfo>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, info: ServiceInfo) -> Self {
    Self { pipeline: Pipeline::with_headers(store), info: Arc::new(info) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { pipeline: self.pipeline.clone(), info: self.info.clone() }
  }
}
