//! Handlers shared by every collection, plus the directory-wide endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/<plural>` | Optional `?q=` and parent filters |
//! | `POST`   | `/<plural>` | 201 with `{"id": ...}` |
//! | `GET`    | `/<plural>/{id}` | 404 if not loaded |
//! | `PATCH`  | `/<plural>/{id}` | Only the fields present are written |
//! | `DELETE` | `/<plural>/{id}` | |
//! | `GET`    | `/status` | Per-collection loading and error |
//! | `POST`   | `/refresh` | Reload everything |
//! | `GET`    | `/summary` | Record counts |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use muster_core::{Id, entity::Entity, store::TableStore};
use muster_sync::{DirectoryStore, Scope, Status, Summary, view::filter};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{error::ApiError, resource::Resource};

type Dir<S> = State<Arc<DirectoryStore<S>>>;

// ─── Collections ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Case-insensitive substring over the record's search keys.
  pub q:             Option<String>,
  pub commission_id: Option<Id>,
  pub district_id:   Option<Id>,
  pub group_id:      Option<Id>,
  pub band_id:       Option<Id>,
}

impl ListParams {
  fn scope(&self) -> Scope {
    Scope {
      commission_id: self.commission_id,
      district_id:   self.district_id,
      group_id:      self.group_id,
      band_id:       self.band_id,
    }
  }
}

/// `GET /<plural>[?q=...][&commission_id=...]...`
///
/// Served from the loaded collection; nothing is fetched.
pub async fn list<S, R>(
  State(dir): Dir<S>,
  Query(params): Query<ListParams>,
) -> Json<Vec<R>>
where
  S: TableStore + 'static,
  R: Resource,
{
  let snapshot = dir.snapshot().await;
  let query = params.q.as_deref().unwrap_or_default();
  let items = filter(R::collection(&snapshot), &snapshot, &params.scope(), query)
    .into_iter()
    .cloned()
    .collect();
  Json(items)
}

/// `GET /<plural>/{id}`
pub async fn get_one<S, R>(
  State(dir): Dir<S>,
  Path(id): Path<Id>,
) -> Result<Json<R>, ApiError>
where
  S: TableStore + 'static,
  R: Resource,
{
  let snapshot = dir.snapshot().await;
  R::collection(&snapshot)
    .iter()
    .find(|r| r.id() == id)
    .cloned()
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("{} {id} not found", R::ENTITY)))
}

/// `POST /<plural>`
pub async fn create<S, R>(
  State(dir): Dir<S>,
  Json(body): Json<R::New>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TableStore + 'static,
  R: Resource,
{
  // A row that was written but not reloaded still exists; report its id so
  // clients do not retry into a duplicate. The reload error shows in /status.
  let id = match R::add(&dir, body).await {
    Ok(id) => id,
    Err(err) => err.saved_id().ok_or(err)?,
  };
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `PATCH /<plural>/{id}`
pub async fn update<S, R>(
  State(dir): Dir<S>,
  Path(id): Path<Id>,
  Json(patch): Json<R::Patch>,
) -> Result<StatusCode, ApiError>
where
  S: TableStore + 'static,
  R: Resource,
{
  R::update(&dir, id, patch).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /<plural>/{id}`
pub async fn remove<S, R>(
  State(dir): Dir<S>,
  Path(id): Path<Id>,
) -> Result<StatusCode, ApiError>
where
  S: TableStore + 'static,
  R: Resource,
{
  R::delete(&dir, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StatusBody {
  pub loading:     bool,
  pub error:       Option<String>,
  pub collections: BTreeMap<Entity, Status>,
}

/// `GET /status`
pub async fn status<S: TableStore + 'static>(State(dir): Dir<S>) -> Json<StatusBody> {
  Json(StatusBody {
    loading:     dir.is_loading(),
    error:       dir.error(),
    collections: dir.statuses(),
  })
}

/// `POST /refresh`
pub async fn refresh<S: TableStore + 'static>(
  State(dir): Dir<S>,
) -> Result<Json<Summary>, ApiError> {
  dir.fetch_all().await?;
  Ok(Json(dir.snapshot().await.summary()))
}

/// `GET /summary`
pub async fn summary<S: TableStore + 'static>(State(dir): Dir<S>) -> Json<Summary> {
  Json(dir.snapshot().await.summary())
}
