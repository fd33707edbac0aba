//! Handlers for `/claims` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/claims` | Body: [`NewClaim`]; returns 201 + stored claim |
//! | `GET`    | `/claims/latest` | `?item_id&claimer_name`; `null` when there is none |
//! | `PATCH`  | `/claims/{id}` | Body: `{"qty":n}`; 404 if the row is gone |
//! | `DELETE` | `/claims/{id}` | `{"deleted":false}` if already gone |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use potluck_core::{
  claim::{Claim, NewClaim},
  store::PotluckStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Deleted, auth::Authenticated, error::ApiError};

/// `POST /claims`
pub async fn create<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Json(body): Json<NewClaim>,
) -> Result<impl IntoResponse, ApiError> {
  if body.claimer_name.trim().is_empty() {
    return Err(ApiError::BadRequest("claimer_name must not be empty".into()));
  }
  if body.qty == 0 {
    return Err(ApiError::BadRequest("qty must be at least 1".into()));
  }

  let claim = store.add_claim(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(claim)))
}

#[derive(Debug, Deserialize)]
pub struct LatestParams {
  pub item_id:      Uuid,
  pub claimer_name: String,
}

/// `GET /claims/latest?item_id=<id>&claimer_name=<name>`
pub async fn latest<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<LatestParams>,
) -> Result<Json<Option<Claim>>, ApiError> {
  let claim = store
    .latest_claim(params.item_id, &params.claimer_name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(claim))
}

#[derive(Debug, Deserialize)]
pub struct QtyBody {
  pub qty: u32,
}

/// `PATCH /claims/{id}`, body: `{"qty":n}` with `n >= 1`.
pub async fn update_qty<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<QtyBody>,
) -> Result<Json<Claim>, ApiError> {
  if body.qty == 0 {
    return Err(ApiError::BadRequest("qty must be at least 1; delete the claim instead".into()));
  }

  let claim = store
    .update_claim_qty(id, body.qty)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("claim {id} not found")))?;
  Ok(Json(claim))
}

/// `DELETE /claims/{id}`
pub async fn delete_one<S: PotluckStore>(
  State(store): State<Arc<S>>,
  Authenticated(_): Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Deleted>, ApiError> {
  let deleted = store.delete_claim(id).await.map_err(ApiError::store)?;
  Ok(Json(Deleted { deleted }))
}
