//! Integration tests for `SqliteStore`, and for the reconciler and planner
//! running against it, on an in-memory database.

use std::sync::Arc;

use potluck_core::{
  Error as CoreError,
  claim::{Claim, NewClaim},
  event::{Event, EventDraft, NewEvent},
  identity::{IdentityBootstrap, LocalIdentity, Session},
  item::{Item, ItemDraft, NewItem},
  planner::{EVENTS_PAGE_SIZE, Planner, Snapshot},
  reconcile::{self, ClaimChange},
  store::{EventQuery, PotluckStore, Rejection, StoreError as _},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn event(s: &SqliteStore, slug: &str) -> Event {
  s.create_event(NewEvent {
    slug:      slug.into(),
    title:     format!("Event {slug}"),
    host_name: None,
  })
  .await
  .unwrap()
}

async fn item(s: &SqliteStore, event: &Event, label: &str) -> Item {
  s.add_item(NewItem {
    event_id:      event.event_id,
    label:         label.into(),
    requested_qty: 1,
    created_by:    "Host".into(),
  })
  .await
  .unwrap()
}

async fn claim(s: &SqliteStore, item: &Item, name: &str, qty: u32) -> Claim {
  s.add_claim(NewClaim { item_id: item.item_id, claimer_name: name.into(), qty })
    .await
    .unwrap()
}

fn planner(s: &SqliteStore) -> Planner<SqliteStore, LocalIdentity<SqliteStore>> {
  let store = Arc::new(s.clone());
  Planner::new(store.clone(), LocalIdentity::new(store))
}

fn draft(label: &str, qty: &str, creator: &str, auto_claim: bool) -> ItemDraft {
  ItemDraft {
    label:         label.into(),
    requested_qty: Some(qty.into()),
    creator_name:  creator.into(),
    auto_claim,
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_resolve_event_by_slug() {
  let s = store().await;
  let created = event(&s, "friday").await;

  let fetched = s.get_event_by_slug("friday").await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert!(s.get_event_by_slug("saturday").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
  let s = store().await;
  event(&s, "friday").await;
  let dup = s
    .create_event(NewEvent { slug: "friday".into(), title: "Again".into(), host_name: None })
    .await;
  let err = dup.unwrap_err();
  assert!(matches!(&err, crate::Error::SlugTaken(slug) if slug == "friday"));
  assert_eq!(err.rejection(), Some(Rejection::Conflict));
}

#[tokio::test]
async fn list_events_newest_first_with_paging() {
  let s = store().await;
  for slug in ["a", "b", "c"] {
    event(&s, slug).await;
  }

  let page = s.list_events(EventQuery { offset: 0, limit: 2 }).await.unwrap();
  let slugs: Vec<_> = page.iter().map(|e| e.slug.as_str()).collect();
  assert_eq!(slugs, ["c", "b"]);

  let rest = s.list_events(EventQuery { offset: 2, limit: 2 }).await.unwrap();
  assert_eq!(rest.len(), 1);
  assert_eq!(rest[0].slug, "a");
}

#[tokio::test]
async fn offsets_beyond_i64_list_nothing() {
  let s = store().await;
  event(&s, "a").await;

  let past = s.list_events(EventQuery { offset: usize::MAX, limit: 20 }).await.unwrap();
  assert!(past.is_empty());

  let all = s.list_events(EventQuery { offset: 0, limit: usize::MAX }).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn delete_event_cascades_to_items_and_claims() {
  let s = store().await;
  let ev = event(&s, "party").await;
  let it = item(&s, &ev, "Chips").await;
  claim(&s, &it, "Alice", 2).await;

  assert!(s.delete_event(ev.event_id).await.unwrap());
  assert!(s.list_items(ev.event_id).await.unwrap().is_empty());
  assert!(s.latest_claim(it.item_id, "Alice").await.unwrap().is_none());
  assert!(!s.delete_event(ev.event_id).await.unwrap());
}

// ─── Items and claims ────────────────────────────────────────────────────────

#[tokio::test]
async fn items_are_listed_oldest_first_per_event() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let other = event(&s, "two").await;
  item(&s, &ev, "Bread").await;
  item(&s, &other, "Elsewhere").await;
  item(&s, &ev, "Cheese").await;

  let labels: Vec<_> = s
    .list_items(ev.event_id)
    .await
    .unwrap()
    .into_iter()
    .map(|it| it.label)
    .collect();
  assert_eq!(labels, ["Bread", "Cheese"]);
}

#[tokio::test]
async fn list_claims_is_restricted_to_the_event() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let other = event(&s, "two").await;
  let bread = item(&s, &ev, "Bread").await;
  let wine = item(&s, &other, "Wine").await;
  claim(&s, &bread, "Alice", 1).await;
  claim(&s, &wine, "Bob", 1).await;
  claim(&s, &bread, "Carol", 3).await;

  let claims = s.list_claims(ev.event_id).await.unwrap();
  let names: Vec<_> = claims.iter().map(|c| c.claimer_name.as_str()).collect();
  assert_eq!(names, ["Alice", "Carol"]);
}

#[tokio::test]
async fn zero_quantity_claim_is_rejected() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  let res = s
    .add_claim(NewClaim { item_id: it.item_id, claimer_name: "Alice".into(), qty: 0 })
    .await;
  assert!(res.is_err());
}

#[tokio::test]
async fn claim_on_missing_item_is_rejected() {
  let s = store().await;
  let res = s
    .add_claim(NewClaim { item_id: Uuid::new_v4(), claimer_name: "Alice".into(), qty: 1 })
    .await;
  let err = res.unwrap_err();
  assert!(matches!(err, crate::Error::ItemNotFound(_)));
  assert_eq!(err.rejection(), Some(Rejection::Invalid));
}

#[tokio::test]
async fn item_on_missing_event_is_rejected() {
  let s = store().await;
  let res = s
    .add_item(NewItem {
      event_id:      Uuid::new_v4(),
      label:         "Chips".into(),
      requested_qty: 1,
      created_by:    "Alice".into(),
    })
    .await;
  assert!(matches!(res, Err(crate::Error::EventNotFound(_))));
}

#[tokio::test]
async fn latest_claim_picks_the_newest_row() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  claim(&s, &it, "Alice", 5).await;
  let newest = claim(&s, &it, "Alice", 2).await;
  claim(&s, &it, "Bob", 1).await;

  let latest = s.latest_claim(it.item_id, "Alice").await.unwrap().unwrap();
  assert_eq!(latest.claim_id, newest.claim_id);
  assert!(s.latest_claim(it.item_id, "alice").await.unwrap().is_none());
}

#[tokio::test]
async fn update_and_delete_missing_claim_are_harmless() {
  let s = store().await;
  assert!(s.update_claim_qty(Uuid::new_v4(), 3).await.unwrap().is_none());
  assert!(!s.delete_claim(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn delete_item_removes_its_claims() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  claim(&s, &it, "Alice", 2).await;

  assert!(s.delete_item(it.item_id).await.unwrap());
  assert!(s.list_claims(ev.event_id).await.unwrap().is_empty());
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_name_roundtrip() {
  let s = store().await;
  let session = s.create_session().await.unwrap();
  assert_eq!(session.name, None);

  let named = s.set_session_name(session.session_id, "Alice").await.unwrap().unwrap();
  assert_eq!(named.name.as_deref(), Some("Alice"));
  assert_eq!(s.get_session(session.session_id).await.unwrap(), Some(named));

  assert!(s.set_session_name(Uuid::new_v4(), "Bob").await.unwrap().is_none());
}

#[tokio::test]
async fn local_identity_is_idempotent() {
  let s = Arc::new(store().await);
  let identity = LocalIdentity::new(s.clone());

  let first = identity.ensure_session().await.unwrap();
  let second = identity.ensure_session().await.unwrap();
  assert_eq!(first.session_id, second.session_id);
  assert_eq!(identity.current(), Some(first.session_id));
}

#[tokio::test]
async fn local_identity_replaces_a_forgotten_session() {
  let s = Arc::new(store().await);
  let stale = Uuid::new_v4();
  let identity = LocalIdentity::with_session(s.clone(), Some(stale));

  let session = identity.ensure_session().await.unwrap();
  assert_ne!(session.session_id, stale);
  assert_eq!(identity.current(), Some(session.session_id));
}

#[tokio::test]
async fn attach_name_labels_the_session() {
  let s = Arc::new(store().await);
  let identity = LocalIdentity::new(s.clone());

  let session = identity.attach_name("  Alice ").await.unwrap();
  assert_eq!(session.name.as_deref(), Some("Alice"));
  assert!(matches!(identity.attach_name(" ").await, Err(CoreError::EmptyName)));
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn increment_inserts_a_fresh_unit_row_each_time() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;

  for _ in 0..2 {
    let change = reconcile::increment(&s, it.item_id, " Alice ").await.unwrap();
    assert!(matches!(change, ClaimChange::Added(ref c) if c.qty == 1 && c.claimer_name == "Alice"));
  }
  assert_eq!(s.list_claims(ev.event_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn decrement_without_claims_is_a_noop() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  claim(&s, &it, "Bob", 1).await;

  let change = reconcile::decrement(&s, it.item_id, "Alice").await.unwrap();
  assert_eq!(change, ClaimChange::Unchanged);
  assert_eq!(s.list_claims(ev.event_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn decrement_reduces_a_multi_unit_row() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  let row = claim(&s, &it, "Alice", 3).await;

  let change = reconcile::decrement(&s, it.item_id, "Alice").await.unwrap();
  assert!(matches!(change, ClaimChange::Reduced(ref c) if c.claim_id == row.claim_id && c.qty == 2));
}

#[tokio::test]
async fn decrement_deletes_a_single_unit_row() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  let row = claim(&s, &it, "Alice", 1).await;

  let change = reconcile::decrement(&s, it.item_id, "Alice").await.unwrap();
  assert_eq!(change, ClaimChange::Removed(row.claim_id));
  assert!(s.latest_claim(it.item_id, "Alice").await.unwrap().is_none());
}

#[tokio::test]
async fn decrement_only_touches_the_newest_row() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  let older = claim(&s, &it, "Alice", 4).await;
  claim(&s, &it, "Alice", 1).await;

  reconcile::decrement(&s, it.item_id, "Alice").await.unwrap();

  let claims = s.list_claims(ev.event_id).await.unwrap();
  assert_eq!(claims, vec![older]);
}

#[tokio::test]
async fn increment_then_decrement_restores_the_claim_set() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  claim(&s, &it, "Alice", 2).await;
  let before = s.list_claims(ev.event_id).await.unwrap();

  reconcile::increment(&s, it.item_id, "Alice").await.unwrap();
  reconcile::decrement(&s, it.item_id, "Alice").await.unwrap();

  assert_eq!(s.list_claims(ev.event_id).await.unwrap(), before);
}

#[tokio::test]
async fn concurrent_decrements_of_the_last_unit_remove_it_once() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;
  claim(&s, &it, "Alice", 1).await;

  let (a, b) = tokio::join!(
    reconcile::decrement(&s, it.item_id, "Alice"),
    reconcile::decrement(&s, it.item_id, "Alice"),
  );
  let changes = [a.unwrap(), b.unwrap()];
  let removed = changes
    .iter()
    .filter(|c| matches!(c, ClaimChange::Removed(_)))
    .count();
  assert_eq!(removed, 1);
  assert!(changes.contains(&ClaimChange::Unchanged));
  assert!(s.list_claims(ev.event_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reconcile_rejects_blank_names_before_writing() {
  let s = store().await;
  let ev = event(&s, "one").await;
  let it = item(&s, &ev, "Bread").await;

  let inc = reconcile::increment(&s, it.item_id, "  ").await;
  let dec = reconcile::decrement(&s, it.item_id, "").await;
  assert!(matches!(inc, Err(CoreError::EmptyName)));
  assert!(matches!(dec, Err(CoreError::EmptyName)));
  assert!(s.list_claims(ev.event_id).await.unwrap().is_empty());
}

// ─── Planner ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_event_seeds_default_items() {
  let s = store().await;
  let p = planner(&s);

  let ev = p
    .create_event(EventDraft {
      title:       "Cuma Rakısı".into(),
      host_name:   Some("  Deniz ".into()),
      custom_slug: None,
    })
    .await
    .unwrap();
  assert_eq!(ev.slug, "cuma-rakisi");
  assert_eq!(ev.host_name.as_deref(), Some("Deniz"));

  let snap = p.load("cuma-rakisi").await.unwrap();
  let seeded: Vec<_> = snap
    .items
    .iter()
    .map(|it| (it.label.as_str(), it.requested_qty))
    .collect();
  assert_eq!(
    seeded,
    [("Salata", 1), ("Tatlı", 1), ("İçecek (2L)", 2), ("Atıştırmalık", 2)]
  );
  assert!(snap.claims.is_empty());
}

#[tokio::test]
async fn create_event_validates_title_and_slug() {
  let s = store().await;
  let p = planner(&s);

  let blank = p.create_event(EventDraft { title: "  ".into(), ..Default::default() }).await;
  assert!(matches!(blank, Err(CoreError::EmptyTitle)));

  let no_slug = p.create_event(EventDraft { title: "!!!".into(), ..Default::default() }).await;
  assert!(matches!(no_slug, Err(CoreError::EmptySlug)));

  assert!(s.list_events(EventQuery::page(0, 10)).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_event_reports_a_taken_slug() {
  let s = store().await;
  let p = planner(&s);
  let draft = || EventDraft { title: "Friday".into(), ..Default::default() };

  p.create_event(draft()).await.unwrap();
  let again = p.create_event(draft()).await.unwrap_err();
  assert!(matches!(&again, CoreError::SlugTaken(slug) if slug == "friday"));
  assert!(again.is_validation());
}

#[tokio::test]
async fn huge_page_number_lists_nothing() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "a").await;

  let page = p.list_events(usize::MAX / 10).await.unwrap();
  assert!(page.events.is_empty());
  assert!(!page.has_more);
}

#[tokio::test]
async fn list_events_reports_more_pages() {
  let s = store().await;
  let p = planner(&s);
  for n in 0..=EVENTS_PAGE_SIZE {
    event(&s, &format!("ev-{n}")).await;
  }

  let first = p.list_events(0).await.unwrap();
  assert_eq!(first.events.len(), EVENTS_PAGE_SIZE);
  assert!(first.has_more);

  let second = p.list_events(1).await.unwrap();
  assert_eq!(second.events.len(), 1);
  assert!(!second.has_more);
}

#[tokio::test]
async fn load_unknown_slug_is_not_found() {
  let s = store().await;
  let p = planner(&s);
  assert!(matches!(p.load("nope").await, Err(CoreError::EventNotFound(slug)) if slug == "nope"));
}

#[tokio::test]
async fn add_item_with_auto_claim_claims_the_requested_quantity() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "party").await;
  let snap = p.load("party").await.unwrap();

  let snap = p.add_item(&snap, draft(" Bread ", "3", " Alice ", true)).await.unwrap();

  assert_eq!(snap.items.len(), 1);
  let bread = &snap.items[0];
  assert_eq!(bread.label, "Bread");
  assert_eq!(bread.requested_qty, 3);
  assert_eq!(bread.created_by, "Alice");

  assert_eq!(snap.claims.len(), 1);
  assert_eq!(snap.claims[0].item_id, bread.item_id);
  assert_eq!(snap.claims[0].claimer_name, "Alice");
  assert_eq!(snap.claims[0].qty, 3);

  let session = p.identity().ensure_session().await.unwrap();
  assert_eq!(session.name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn add_item_without_auto_claim_leaves_it_unclaimed() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "party").await;
  let snap = p.load("party").await.unwrap();

  let snap = p.add_item(&snap, draft("Juice", "nonsense", "Bob", false)).await.unwrap();
  assert_eq!(snap.items[0].requested_qty, 1);
  assert!(snap.claims.is_empty());
}

#[tokio::test]
async fn add_item_validates_before_any_write() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "party").await;
  let snap = p.load("party").await.unwrap();

  let no_label = p.add_item(&snap, draft("  ", "1", "Alice", true)).await;
  assert!(matches!(no_label, Err(CoreError::EmptyLabel)));
  let no_name = p.add_item(&snap, draft("Bread", "1", " ", true)).await;
  assert!(matches!(no_name, Err(CoreError::EmptyName)));

  assert_eq!(p.identity().current(), None);
  assert!(s.list_items(snap.event.event_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_item_insert_writes_no_claim() {
  let s = store().await;
  let p = planner(&s);
  let ev = event(&s, "party").await;
  let snap = p.load("party").await.unwrap();
  s.delete_event(ev.event_id).await.unwrap();

  let res = p.add_item(&snap, draft("Bread", "2", "Alice", true)).await;
  assert!(matches!(res, Err(CoreError::Store(_))));
  assert!(s.list_claims(ev.event_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_auto_claim_keeps_the_item() {
  let s = store().await;
  event(&s, "party").await;
  let flaky = Arc::new(NoClaims(s.clone()));
  let p = Planner::new(flaky.clone(), LocalIdentity::new(flaky));
  let snap = p.load("party").await.unwrap();

  let snap = p.add_item(&snap, draft("Bread", "3", "Alice", true)).await.unwrap();
  assert_eq!(snap.items.len(), 1);
  assert!(snap.claims.is_empty());
}

#[tokio::test]
async fn claim_buttons_drive_the_aggregate() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "party").await;
  let snap = p.load("party").await.unwrap();
  let snap = p.add_item(&snap, draft("Salad", "2", "Alice", true)).await.unwrap();
  let salad = snap.items[0].item_id;

  let snap = p.increment(&snap, salad, "Bob").await.unwrap();
  let c = snap.contributions("Alice");
  assert_eq!(c.mine(salad), 2);
  assert_eq!(c.contributors(salad).collect::<Vec<_>>(), [("Alice", 2), ("Bob", 1)]);

  let snap = p.decrement(&snap, salad, "Bob").await.unwrap();
  let c = snap.contributions("Bob");
  assert_eq!(c.mine(salad), 0);
  assert_eq!(c.contributors(salad).collect::<Vec<_>>(), [("Alice", 2)]);

  let snap = p.decrement(&snap, salad, "Alice").await.unwrap();
  assert_eq!(snap.contributions("Alice").mine(salad), 1);
}

#[tokio::test]
async fn delete_item_drops_item_and_claims_from_the_next_snapshot() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "party").await;
  let snap = p.load("party").await.unwrap();
  let snap = p.add_item(&snap, draft("Salad", "2", "Alice", true)).await.unwrap();
  let snap = p.add_item(&snap, draft("Bread", "1", "Bob", true)).await.unwrap();
  let salad = snap.items[0].item_id;
  let snap = p.increment(&snap, salad, "Carol").await.unwrap();

  let snap = p.delete_item(&snap, salad).await.unwrap();
  assert!(snap.item(salad).is_none());
  assert!(snap.claims.iter().all(|c| c.item_id != salad));
  assert_eq!(snap.claims.len(), 1);
}

#[tokio::test]
async fn failed_write_leaves_the_snapshot_untouched() {
  let s = store().await;
  let p = planner(&s);
  event(&s, "party").await;
  let snap = p.load("party").await.unwrap();
  let before: Snapshot = snap.clone();

  let res = p.increment(&snap, Uuid::new_v4(), "Alice").await;
  assert!(res.is_err());
  assert_eq!(snap, before);
}

// ─── Test doubles ────────────────────────────────────────────────────────────

/// Delegates to SQLite but refuses every claim insert.
struct NoClaims(SqliteStore);

impl PotluckStore for NoClaims {
  type Error = crate::Error;

  async fn create_event(&self, input: NewEvent) -> crate::Result<Event> { self.0.create_event(input).await }
  async fn list_events(&self, query: EventQuery) -> crate::Result<Vec<Event>> { self.0.list_events(query).await }
  async fn get_event_by_slug(&self, slug: &str) -> crate::Result<Option<Event>> { self.0.get_event_by_slug(slug).await }
  async fn delete_event(&self, id: Uuid) -> crate::Result<bool> { self.0.delete_event(id).await }
  async fn add_item(&self, input: NewItem) -> crate::Result<Item> { self.0.add_item(input).await }
  async fn list_items(&self, id: Uuid) -> crate::Result<Vec<Item>> { self.0.list_items(id).await }
  async fn delete_item(&self, id: Uuid) -> crate::Result<bool> { self.0.delete_item(id).await }
  async fn add_claim(&self, _: NewClaim) -> crate::Result<Claim> { Err(crate::Error::Quantity(0)) }
  async fn list_claims(&self, id: Uuid) -> crate::Result<Vec<Claim>> { self.0.list_claims(id).await }
  async fn latest_claim(&self, id: Uuid, name: &str) -> crate::Result<Option<Claim>> { self.0.latest_claim(id, name).await }
  async fn update_claim_qty(&self, id: Uuid, qty: u32) -> crate::Result<Option<Claim>> { self.0.update_claim_qty(id, qty).await }
  async fn delete_claim(&self, id: Uuid) -> crate::Result<bool> { self.0.delete_claim(id).await }
  async fn create_session(&self) -> crate::Result<Session> { self.0.create_session().await }
  async fn get_session(&self, id: Uuid) -> crate::Result<Option<Session>> { self.0.get_session(id).await }
  async fn set_session_name(&self, id: Uuid, name: &str) -> crate::Result<Option<Session>> { self.0.set_session_name(id, name).await }
}
