//! Handlers for the root and health endpoints. All are public.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Service information |
//! | `GET`  | `/health` | Liveness; never touches the store |
//! | `GET`  | `/health/ready` | 503 if the store does not answer |

use axum::{Json, extract::State, http::StatusCode};
use quire_core::{pipeline::Operation, store::TenantStore};
use serde_json::{Value, json};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// `GET /`
pub async fn root<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError>
where
  S: TenantStore + 'static,
{
  let info = state.info.clone();
  state
    .pipeline
    .run_public(Operation::ServiceInfo, |_| async move {
      Ok::<_, ApiError>(Json(json!({
        "name":        info.app_name,
        "version":     info.version,
        "environment": info.environment,
        "status":      "running",
      })))
    })
    .await
}

/// `GET /health`
pub async fn health<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError>
where
  S: TenantStore + 'static,
{
  let info = state.info.clone();
  state
    .pipeline
    .run_public(Operation::Health, |_| async move {
      Ok::<_, ApiError>(Json(json!({
        "status":      "healthy",
        "app":         info.app_name,
        "version":     info.version,
        "environment": info.environment,
      })))
    })
    .await
}

/// `GET /health/ready`
pub async fn ready<S>(
  State(state): State<AppState<S>>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run_public(Operation::Readiness, |ctx| async move {
      let reply = match ctx.directory().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(e) => {
          warn!(error = %e, "readiness check failed");
          (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready" })),
          )
        }
      };
      Ok::<_, ApiError>(reply)
    })
    .await
}
