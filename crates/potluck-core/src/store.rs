//! The `PotluckStore` trait and supporting query types.
//!
//! The trait is the CRUD contract of the remote data store. It is implemented
//! by storage backends (e.g. `potluck-store-sqlite`) and by HTTP clients of
//! `potluck-api`. Higher layers depend on this abstraction only.

use std::future::Future;

use chrono::{DateTime, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{
  claim::{Claim, NewClaim},
  event::{Event, NewEvent},
  identity::Session,
  item::{Item, NewItem},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Paging parameters for [`PotluckStore::list_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventQuery {
  pub offset: usize,
  pub limit:  usize,
}

impl EventQuery {
  /// Zero-based page `page` of `page_size` events. Pages past the
  /// addressable range clamp to an offset that matches nothing.
  pub fn page(page: usize, page_size: usize) -> Self {
    Self { offset: page.saturating_mul(page_size), limit: page_size }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a store refused a write, when the refusal is the caller's doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
  /// A uniqueness rule was broken, e.g. an event slug already in use.
  Conflict,
  /// The write referenced a row that is gone or broke a value rule.
  Invalid,
}

/// Error type of a [`PotluckStore`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `None` for infrastructure failures.
  fn rejection(&self) -> Option<Rejection>;
}

/// Timestamp for a new row: now, truncated to microseconds so that stored
/// and returned values compare equal and sort lexically when encoded.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the remote data store.
///
/// Deletes report whether a row was removed; deleting a row that is already
/// gone is not an error. Deleting an event removes its items, and deleting
/// an item removes its claims.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PotluckStore: Send + Sync {
  type Error: StoreError;

  // ── Events ────────────────────────────────────────────────────────────

  /// Persist a new event. A taken slug is a [`Rejection::Conflict`].
  fn create_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// List events, newest first.
  fn list_events(
    &self,
    query: EventQuery,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Resolve a slug. Returns `None` if no event carries it.
  fn get_event_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + 'a;

  fn delete_event(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Persist a new item and return the stored row.
  fn add_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// All items of an event, oldest first.
  fn list_items(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send + '_;

  fn delete_item(
    &self,
    item_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Claims ────────────────────────────────────────────────────────────

  fn add_claim(
    &self,
    input: NewClaim,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + '_;

  /// All claims on items of an event, oldest first.
  fn list_claims(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + '_;

  /// The most recently created claim row for `(item_id, claimer_name)`.
  /// Rows with equal `created_at` are ordered by insertion.
  fn latest_claim<'a>(
    &'a self,
    item_id: Uuid,
    claimer_name: &'a str,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + 'a;

  /// Overwrite the quantity of one claim row. Returns `None` if the row no
  /// longer exists.
  fn update_claim_qty(
    &self,
    claim_id: Uuid,
    qty: u32,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + '_;

  fn delete_claim(
    &self,
    claim_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Create a new anonymous session with no name attached.
  fn create_session(
    &self,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Attach a display name to a session. Returns `None` if the session does
  /// not exist.
  fn set_session_name<'a>(
    &'a self,
    session_id: Uuid,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;
}
