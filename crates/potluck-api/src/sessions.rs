//! Handlers for `/sessions` endpoints (anonymous sign-in).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/sessions` | Returns 201 + a new unnamed [`Session`] |
//! | `GET`  | `/sessions/{id}` | 404 if not found |
//! | `PUT`  | `/sessions/{id}/name` | Body: `{"name":"..."}`; bearer must be that session |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{identity::Session, store::PotluckStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{auth::Authenticated, error::ApiError};

/// `POST /sessions`
pub async fn create<S: PotluckStore>(
  State(store): State<Arc<S>>,
) -> Result<impl IntoResponse, ApiError> {
  let session = store.create_session().await.map_err(ApiError::store)?;
  tracing::debug!(session_id = %session.session_id, "anonymous session created");
  Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /sessions/{id}`
pub async fn get_one<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
  let session = store
    .get_session(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))?;
  Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct NameBody {
  pub name: String,
}

/// `PUT /sessions/{id}/name`
pub async fn set_name<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(caller): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<NameBody>,
) -> Result<Json<Session>, ApiError> {
  if caller.session_id != id {
    return Err(ApiError::Unauthorized);
  }
  let name = body.name.trim();
  if name.is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }

  let session = store
    .set_session_name(id, name)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("session {id} not found")))?;
  Ok(Json(session))
}
