//! Handlers for `/organizations/{org_id}/users` endpoints. Admin only.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/organizations/{org_id}/users` | |
//! | `POST` | `/organizations/{org_id}/users` | Body: `{"email","name","role"?}`; role defaults to `reader` |
//! | `GET`  | `/organizations/{org_id}/users/{user_id}` | |
//! | `PUT`  | `/organizations/{org_id}/users/{user_id}` | Body: `{"name"?,"role"?}` |
//!
//! The `{org_id}` segment must name the caller's own organization; any other
//! value is answered with 404 so foreign organizations are never confirmed.

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
};
use quire_core::{
  Error,
  gateway::Gateway,
  permission::ResourceType,
  pipeline::Operation,
  store::TenantStore,
  user::{NewUser, Role, User, UserPatch},
};
use serde::Deserialize;

use crate::{
  decode_body, error::ApiError, metadata::HeaderMetadata, path_id, state::AppState, validate,
};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub email: String,
  pub name:  String,
  #[serde(default)]
  pub role:  Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name: Option<String>,
  pub role: Option<Role>,
}

/// 404 unless `raw` is the gateway's own organization.
fn own_org<S: TenantStore>(gateway: &Gateway<S>, raw: &str) -> Result<(), ApiError> {
  let id = path_id(ResourceType::Organization, raw)?;
  if id != gateway.identity().organization_id() {
    return Err(Error::not_found(ResourceType::Organization, raw).into());
  }
  Ok(())
}

/// `GET /organizations/{org_id}/users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(org_id): Path<String>,
  headers: HeaderMap,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::ListUsers, &HeaderMetadata(&headers), |ctx| async move {
      let gateway = ctx.tenant()?;
      own_org(&gateway, &org_id)?;
      Ok::<_, ApiError>(Json(gateway.list_users().await?))
    })
    .await
}

/// `POST /organizations/{org_id}/users`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Path(org_id): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<(StatusCode, Json<User>), ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::CreateUser, &HeaderMetadata(&headers), |ctx| async move {
      let gateway = ctx.tenant()?;
      own_org(&gateway, &org_id)?;

      let CreateBody { email, name, role } = decode_body(&body)?;
      let input = NewUser { email, name, role };
      validate::new_user(&input)?;

      let user = gateway.create_user(input).await?;
      Ok::<_, ApiError>((StatusCode::CREATED, Json(user)))
    })
    .await
}

/// `GET /organizations/{org_id}/users/{user_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path((org_id, user_id)): Path<(String, String)>,
  headers: HeaderMap,
) -> Result<Json<User>, ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::GetUser, &HeaderMetadata(&headers), |ctx| async move {
      let gateway = ctx.tenant()?;
      own_org(&gateway, &org_id)?;
      let id = path_id(ResourceType::User, &user_id)?;
      Ok::<_, ApiError>(Json(gateway.get_user(id).await?))
    })
    .await
}

/// `PUT /organizations/{org_id}/users/{user_id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path((org_id, user_id)): Path<(String, String)>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<User>, ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::UpdateUser, &HeaderMetadata(&headers), |ctx| async move {
      let gateway = ctx.tenant()?;
      own_org(&gateway, &org_id)?;
      let id = path_id(ResourceType::User, &user_id)?;

      let UpdateBody { name, role } = decode_body(&body)?;
      let patch = UserPatch { name, role };
      validate::user_patch(&patch)?;

      Ok::<_, ApiError>(Json(gateway.update_user(id, patch).await?))
    })
    .await
}
