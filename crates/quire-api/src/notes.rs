//! Handlers for `/notes` endpoints. Every note operation is confined to the
//! caller's organization.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notes` | `?skip=&limit=`; newest first |
//! | `POST`   | `/notes` | Body: `{"title","content"}` |
//! | `GET`    | `/notes/{id}` | ETag |
//! | `PUT`    | `/notes/{id}` | Body: `{"title"?,"content"?}` |
//! | `DELETE` | `/notes/{id}` | 204 |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, Uri},
  response::Response,
};
use quire_core::{
  note::{NewNote, Note, NotePatch},
  permission::ResourceType,
  pipeline::Operation,
  store::TenantStore,
};
use serde::Deserialize;

use crate::{
  decode_body,
  error::ApiError,
  etag::{if_none_match_header, json_with_etag},
  metadata::HeaderMetadata,
  path_id,
  state::AppState,
  validate,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub skip:  Option<usize>,
  pub limit: Option<usize>,
}

/// Any `organization_id` or `created_by` sent by the client is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:   String,
  pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub title:   Option<String>,
  pub content: Option<String>,
}

/// `GET /notes[?skip=<n>&limit=<n>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  uri: Uri,
  headers: HeaderMap,
) -> Result<Json<Vec<Note>>, ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::ListNotes, &HeaderMetadata(&headers), |ctx| async move {
      let Query(params) = Query::<ListParams>::try_from_uri(&uri)
        .map_err(|e| ApiError::BadRequest(e.body_text()))?;
      let page = validate::page(params.skip, params.limit)?;

      Ok::<_, ApiError>(Json(ctx.tenant()?.list_notes(page).await?))
    })
    .await
}

/// `POST /notes`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<(StatusCode, Json<Note>), ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::CreateNote, &HeaderMetadata(&headers), |ctx| async move {
      let CreateBody { title, content } = decode_body(&body)?;
      let input = NewNote { title, content };
      validate::new_note(&input)?;

      let note = ctx.tenant()?.create_note(input).await?;
      Ok::<_, ApiError>((StatusCode::CREATED, Json(note)))
    })
    .await
}

/// `GET /notes/{id}`
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
    .run(Operation::GetNote, &HeaderMetadata(&headers), |ctx| async move {
      let id = path_id(ResourceType::Note, &raw_id)?;
      let note = ctx.tenant()?.get_note(id).await?;
      json_with_etag(if_none.as_deref(), &note)
    })
    .await
}

/// `PUT /notes/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<Note>, ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::UpdateNote, &HeaderMetadata(&headers), |ctx| async move {
      let id = path_id(ResourceType::Note, &raw_id)?;
      let UpdateBody { title, content } = decode_body(&body)?;
      let patch = NotePatch { title, content };
      validate::note_patch(&patch)?;

      Ok::<_, ApiError>(Json(ctx.tenant()?.update_note(id, patch).await?))
    })
    .await
}

/// `DELETE /notes/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(raw_id): Path<String>,
  headers: HeaderMap,
) -> Result<StatusCode, ApiError>
where
  S: TenantStore + 'static,
{
  state
    .pipeline
    .run(Operation::DeleteNote, &HeaderMetadata(&headers), |ctx| async move {
      let id = path_id(ResourceType::Note, &raw_id)?;
      ctx.tenant()?.delete_note(id).await?;
      Ok::<_, ApiError>(StatusCode::NO_CONTENT)
    })
    .await
}
