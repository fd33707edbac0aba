//! Bearer-session extractor.
//!
//! Write endpoints require `Authorization: Bearer <session-id>` naming a
//! session the store knows about. This is the access rule the store applies
//! in place of per-row ownership.

use std::sync::Arc;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use potluck_core::{identity::Session, store::PotluckStore};
use uuid::Uuid;

use crate::error::ApiError;

/// Present in a handler's arguments means the request carried a live session.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Session);

/// Pull the session id out of a `Bearer` authorization header.
pub fn bearer_session_id(headers: &HeaderMap) -> Result<Uuid, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let token = value
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized)?;

  Uuid::parse_str(token.trim()).map_err(|_| ApiError::Unauthorized)
}

impl<S> FromRequestParts<Arc<S>> for Authenticated
where
  S: PotluckStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    store: &Arc<S>,
  ) -> Result<Self, Self::Rejection> {
    let session_id = bearer_session_id(&parts.headers)?;
    let session = store
      .get_session(session_id)
      .await
      .map_err(ApiError::store)?
      .ok_or(ApiError::Unauthorized)?;
    Ok(Authenticated(session))
  }
}
