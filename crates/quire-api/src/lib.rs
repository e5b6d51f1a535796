//! JSON REST API for Quire.
//!
//! Exposes an axum [`Router`] backed by any [`quire_core::store::TenantStore`].
//! Every handler runs its operation through the core request pipeline, so
//! identity is extracted, resolved and authorized before a body is even
//! decoded. TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = quire_api::api_router(store.clone(), info, &["*".into()]);
//! ```

pub mod cors;
pub mod error;
pub mod etag;
pub mod health;
pub mod metadata;
pub mod notes;
pub mod organizations;
pub mod state;
pub mod users;
pub mod validate;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use quire_core::{Error, ObjectId, permission::ResourceType, store::TenantStore};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use state::{AppState, ServiceInfo};

/// Build a fully-materialised API router for `store`, answering cross-origin
/// requests from `allowed_origins`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, info: ServiceInfo, allowed_origins: &[String]) -> Router<()>
where
  S: TenantStore + 'static,
{
  Router::new()
    .route("/", get(health::root::<S>))
    .route("/health", get(health::health::<S>))
    .route("/health/ready", get(health::ready::<S>))
    // Organizations
    .route("/organizations", post(organizations::create::<S>))
    .route("/organizations/{org_id}", get(organizations::get_one::<S>))
    // Users
    .route(
      "/organizations/{org_id}/users",
      get(users::list::<S>).post(users::create::<S>),
    )
    .route(
      "/organizations/{org_id}/users/{user_id}",
      get(users::get_one::<S>).put(users::update::<S>),
    )
    // Notes
    .route("/notes", get(notes::list::<S>).post(notes::create::<S>))
    .route(
      "/notes/{id}",
      get(notes::get_one::<S>)
        .put(notes::update::<S>)
        .delete(notes::delete::<S>),
    )
    .layer(cors::cors_layer(allowed_origins))
    .layer(TraceLayer::new_for_http())
    .with_state(AppState::new(store, info))
}

// ─── Shared handler helpers ──────────────────────────────────────────────────

/// Decode a JSON request body. Unknown fields are ignored.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
  serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Parse an id taken from the path. A malformed id cannot name any record, so
/// it is reported as not found.
pub(crate) fn path_id(resource: ResourceType, raw: &str) -> Result<ObjectId, ApiError> {
  ObjectId::parse(raw).map_err(|_| Error::not_found(resource, raw).into())
}
