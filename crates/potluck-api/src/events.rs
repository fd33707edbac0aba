//! Handlers for `/events` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/events` | `?offset&limit`, newest first |
//! | `POST`   | `/events` | Body: [`NewEvent`]; returns 201 + stored event |
//! | `GET`    | `/events/by-slug/{slug}` | 404 if not found |
//! | `DELETE` | `/events/{id}` | Cascades to items and claims |
//! | `GET`    | `/events/{id}/items` | Oldest first |
//! | `GET`    | `/events/{id}/claims` | Claims on the event's items, oldest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{
  claim::Claim,
  event::{Event, NewEvent},
  item::Item,
  store::{EventQuery, PotluckStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Deleted, auth::Authenticated, error::ApiError};

/// Upper bound on `limit` for a single page.
const MAX_PAGE: usize = 100;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub offset: usize,
  pub limit:  Option<usize>,
}

/// `GET /events[?offset=...][&limit=...]`
pub async fn list<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>, ApiError> {
  let query = EventQuery {
    offset: params.offset,
    limit:  params.limit.unwrap_or(20).min(MAX_PAGE),
  };
  let events = store.list_events(query).await.map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /events`
pub async fn create<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError> {
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }
  if body.slug.trim().is_empty() {
    return Err(ApiError::BadRequest("slug must not be empty".into()));
  }

  let event = store.create_event(body).await.map_err(ApiError::store)?;
  tracing::info!(event_id = %event.event_id, slug = %event.slug, "event created");
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /events/by-slug/{slug}`
pub async fn by_slug<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Path(slug): Path<String>,
) -> Result<Json<Event>, ApiError> {
  let event = store
    .get_event_by_slug(&slug)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {slug:?} not found")))?;
  Ok(Json(event))
}

/// `GET /events/{id}/items`
pub async fn items<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Item>>, ApiError> {
  let items = store.list_items(id).await.map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `GET /events/{id}/claims`
pub async fn claims<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Claim>>, ApiError> {
  let claims = store.list_claims(id).await.map_err(ApiError::store)?;
  Ok(Json(claims))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /events/{id}`
pub async fn delete_one<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
  let deleted = store.delete_event(id).await.map_err(ApiError::store)?;
  tracing::info!(event_id = %id, deleted, "event delete");
  Ok(Json(Deleted { deleted }))
}
