//! Handlers for the public `/organizations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/organizations` | Body: `{"name":"Acme"}`; 409 if the name is taken |
//! | `GET`  | `/organizations/{org_id}` | 404 if not found; ETag |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::Response,
};
use quire_core::{
  organization::{NewOrganization, Organization},
  permission::ResourceType,
  pipeline::Operation,
  store::TenantStore,
};
use serde::Deserialize;

use crate::{
  decode_body,
  error::ApiError,
  etag::{if_none_match_header, json_with_etag},
  path_id,
  state::AppState,
  validate,
};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /organizations`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Bytes,
) -> Result<(StatusCode, Json<Organization>), ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run_public(Operation::CreateOrganization, |ctx| async move {
      let CreateBody { name } = decode_body(&body)?;
      let input = NewOrganization { name };
      validate::new_organization(&input)?;

      let org = ctx.directory().create_organization(input).await?;
      Ok::<_, ApiError>((StatusCode::CREATED, Json(org)))
    })
    .await
}

/// `GET /organizations/{org_id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: TenantStore + 'static,
{
  let if_none = if_none_match_header(&headers);
  state
    .pipeline
    .run_public(Operation::GetOrganization, |ctx| async move {
      let id = path_id(ResourceType::Organization, &raw_id)?;
      let org = ctx.directory().get_organization(id).await?;
      json_with_etag(if_none.as_deref(), &org)
    })
    .await
}
