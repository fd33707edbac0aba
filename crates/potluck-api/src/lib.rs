//! JSON REST API for potluck events.
//!
//! Exposes an axum [`Router`] backed by any [`potluck_core::store::PotluckStore`].
//! TLS and transport concerns are the caller's responsibility; writes are
//! gated on a bearer session (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", potluck_api::api_router(store.clone()))
//! ```

pub mod auth;
pub mod claims;
pub mod error;
pub mod events;
pub mod items;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post, put},
};
use potluck_core::store::PotluckStore;
use serde::{Deserialize, Serialize};

pub use error::ApiError;

/// Response body of every `DELETE` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
  pub deleted: bool,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PotluckStore + 'static,
{
  Router::new()
    // Sessions
    .route("/sessions", post(sessions::create::<S>))
    .route("/sessions/{id}", get(sessions::get_one::<S>))
    .route("/sessions/{id}/name", put(sessions::set_name::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events/by-slug/{slug}", get(events::by_slug::<S>))
    .route("/events/{id}", delete(events::delete_one::<S>))
    .route("/events/{id}/items", get(events::items::<S>))
    .route("/events/{id}/claims", get(events::claims::<S>))
    // Items
    .route("/items", post(items::create::<S>))
    .route("/items/{id}", delete(items::delete_one::<S>))
    // Claims
    .route("/claims", post(claims::create::<S>))
    .route("/claims/latest", get(claims::latest::<S>))
    .route("/claims/{id}", patch(claims::update_qty::<S>).delete(claims::delete_one::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
