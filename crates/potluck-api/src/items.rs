//! Handlers for `/items` endpoints. Listing lives under `/events/{id}/items`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{item::NewItem, store::PotluckStore};
use uuid::Uuid;

use crate::{Deleted, auth::Authenticated, error::ApiError};

/// `POST /items`: returns 201 + the stored [`Item`](potluck_core::item::Item).
pub async fn create<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Json(body): Json<NewItem>,
) -> Result<impl IntoResponse, ApiError> {
  if body.label.trim().is_empty() {
    return Err(ApiError::BadRequest("label must not be empty".into()));
  }
  if body.requested_qty == 0 {
    return Err(ApiError::BadRequest("requested_qty must be at least 1".into()));
  }

  let item = store.add_item(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(item)))
}

/// `DELETE /items/{id}`: the item's claims go with it.
pub async fn delete_one<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
  let deleted = store.delete_item(id).await.map_err(ApiError::store)?;
  Ok(Json(Deleted { deleted }))
}
