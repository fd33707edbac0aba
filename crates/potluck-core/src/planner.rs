//! [`Planner`] sequences whole user actions against a store.
//!
//! A client holds one [`Snapshot`] per open event. Every mutating call takes
//! the current snapshot by reference, performs its writes, and returns a
//! fresh snapshot re-read from the store. On error the caller simply keeps
//! the snapshot it already had; nothing is patched locally.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  aggregate::{Contributions, aggregate},
  claim::{Claim, NewClaim},
  event::{DEFAULT_ITEMS, Event, EventDraft, NewEvent},
  identity::IdentityBootstrap,
  item::{Item, ItemDraft, NewItem, coerce_requested_qty},
  reconcile,
  store::{EventQuery, PotluckStore, Rejection, StoreError as _},
};

/// Events per page of [`Planner::list_events`].
pub const EVENTS_PAGE_SIZE: usize = 20;

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A store-confirmed, immutable view of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub event:  Event,
  /// Oldest first.
  pub items:  Vec<Item>,
  /// Oldest first.
  pub claims: Vec<Claim>,
}

impl Snapshot {
  /// Aggregate this snapshot's claims from the point of view of `current_name`.
  pub fn contributions(&self, current_name: &str) -> Contributions {
    aggregate(&self.items, &self.claims, current_name)
  }

  pub fn item(&self, item_id: Uuid) -> Option<&Item> {
    self.items.iter().find(|it| it.item_id == item_id)
  }
}

/// One page of the events list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage {
  pub events:   Vec<Event>,
  /// A full page came back, so there may be more.
  pub has_more: bool,
}

// ─── Planner ─────────────────────────────────────────────────────────────────

pub struct Planner<S, I> {
  store:    Arc<S>,
  identity: I,
}

impl<S, I> Planner<S, I>
where
  S: PotluckStore,
  I: IdentityBootstrap,
{
  pub fn new(store: Arc<S>, identity: I) -> Self { Self { store, identity } }

  pub fn identity(&self) -> &I { &self.identity }

  // ── Events ────────────────────────────────────────────────────────────

  /// Create an event and seed it with [`DEFAULT_ITEMS`].
  ///
  /// Seeding is best effort: a failed default item is logged and the event
  /// is kept.
  pub async fn create_event(&self, draft: EventDraft) -> Result<Event> {
    let title = draft.title.trim();
    if title.is_empty() {
      return Err(Error::EmptyTitle);
    }
    let slug = draft.slug();
    if slug.is_empty() {
      return Err(Error::EmptySlug);
    }
    let host_name = draft
      .host_name
      .as_deref()
      .map(str::trim)
      .filter(|h| !h.is_empty())
      .map(str::to_owned);

    let event = self
      .store
      .create_event(NewEvent { slug: slug.clone(), title: title.to_owned(), host_name })
      .await
      .map_err(|e| match e.rejection() {
        Some(Rejection::Conflict) => Error::SlugTaken(slug),
        _ => Error::store(e),
      })?;
    tracing::info!(event_id = %event.event_id, slug = %event.slug, "event created");

    for (label, requested_qty) in DEFAULT_ITEMS {
      let seeded = self
        .store
        .add_item(NewItem {
          event_id:      event.event_id,
          label:         (*label).to_owned(),
          requested_qty: *requested_qty,
          created_by:    String::new(),
        })
        .await;
      if let Err(e) = seeded {
        tracing::warn!(event_id = %event.event_id, label, error = %e, "failed to seed default item");
      }
    }

    Ok(event)
  }

  /// Zero-based page of events, newest first.
  pub async fn list_events(&self, page: usize) -> Result<EventPage> {
    let events = self
      .store
      .list_events(EventQuery::page(page, EVENTS_PAGE_SIZE))
      .await
      .map_err(Error::store)?;
    let has_more = events.len() == EVENTS_PAGE_SIZE;
    Ok(EventPage { events, has_more })
  }

  /// Delete an event together with its items and claims. Returns whether
  /// the event still existed.
  pub async fn delete_event(&self, event_id: Uuid) -> Result<bool> {
    let deleted = self.store.delete_event(event_id).await.map_err(Error::store)?;
    tracing::info!(%event_id, deleted, "event delete");
    Ok(deleted)
  }

  // ── Snapshots ─────────────────────────────────────────────────────────

  /// Resolve `slug` and read its items and claims.
  pub async fn load(&self, slug: &str) -> Result<Snapshot> {
    let event = self
      .store
      .get_event_by_slug(slug)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::EventNotFound(slug.to_owned()))?;
    self.reload(event).await
  }

  /// Re-read items and claims of `event`. The two reads are independent and
  /// run concurrently.
  pub async fn reload(&self, event: Event) -> Result<Snapshot> {
    let id = event.event_id;
    let (items, claims) =
      tokio::try_join!(self.store.list_items(id), self.store.list_claims(id))
        .map_err(Error::store)?;
    Ok(Snapshot { event, items, claims })
  }

  async fn reload_claims(&self, snapshot: &Snapshot) -> Result<Snapshot> {
    let claims = self
      .store
      .list_claims(snapshot.event.event_id)
      .await
      .map_err(Error::store)?;
    Ok(Snapshot {
      event: snapshot.event.clone(),
      items: snapshot.items.clone(),
      claims,
    })
  }

  // ── Items ─────────────────────────────────────────────────────────────

  /// Add an item to the snapshot's event.
  ///
  /// With `auto_claim`, the creator then claims the full requested quantity.
  /// That second write is best effort: if it fails the item stays, unclaimed,
  /// and the failure is only logged.
  pub async fn add_item(&self, snapshot: &Snapshot, draft: ItemDraft) -> Result<Snapshot> {
    let label = draft.label.trim();
    let creator = draft.creator_name.trim();
    if label.is_empty() {
      return Err(Error::EmptyLabel);
    }
    if creator.is_empty() {
      return Err(Error::EmptyName);
    }
    let requested_qty = coerce_requested_qty(draft.requested_qty.as_deref());

    self.identity.ensure_session().await?;
    self.identity.attach_name(creator).await?;

    let item = self
      .store
      .add_item(NewItem {
        event_id: snapshot.event.event_id,
        label: label.to_owned(),
        requested_qty,
        created_by: creator.to_owned(),
      })
      .await
      .map_err(Error::store)?;
    tracing::debug!(item_id = %item.item_id, label, requested_qty, "item added");

    if draft.auto_claim {
      let claimed = self
        .store
        .add_claim(NewClaim {
          item_id:      item.item_id,
          claimer_name: creator.to_owned(),
          qty:          requested_qty,
        })
        .await;
      if let Err(e) = claimed {
        tracing::warn!(item_id = %item.item_id, error = %e, "auto-claim failed, item kept unclaimed");
      }
    }

    self.reload(snapshot.event.clone()).await
  }

  /// Delete an item; its claims go with it.
  pub async fn delete_item(&self, snapshot: &Snapshot, item_id: Uuid) -> Result<Snapshot> {
    let deleted = self.store.delete_item(item_id).await.map_err(Error::store)?;
    tracing::debug!(%item_id, deleted, "item delete");
    self.reload(snapshot.event.clone()).await
  }

  // ── Claims ────────────────────────────────────────────────────────────

  /// `+` on an item: one more unit for `claimer_name`.
  pub async fn increment(
    &self,
    snapshot: &Snapshot,
    item_id: Uuid,
    claimer_name: &str,
  ) -> Result<Snapshot> {
    reconcile::increment(&*self.store, item_id, claimer_name).await?;
    self.reload_claims(snapshot).await
  }

  /// `−` on an item: one unit less for `claimer_name`, if they have any.
  pub async fn decrement(
    &self,
    snapshot: &Snapshot,
    item_id: Uuid,
    claimer_name: &str,
  ) -> Result<Snapshot> {
    reconcile::decrement(&*self.store, item_id, claimer_name).await?;
    self.reload_claims(snapshot).await
  }
}
