//! The SQLite implementation of [`PotluckStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use potluck_core::{
  claim::{Claim, NewClaim},
  event::{Event, NewEvent},
  identity::Session,
  item::{Item, NewItem},
  store::{EventQuery, PotluckStore, now},
};

use crate::{
  Error, Result,
  encode::{
    CLAIM_COLUMNS, EVENT_COLUMNS, ITEM_COLUMNS, RawClaim, RawEvent, RawItem, RawSession,
    SESSION_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A potluck store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `DELETE ... WHERE <key> = ?1` and report whether a row went away.
  async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await?;
    Ok(changed > 0)
  }

  async fn get_claim(&self, claim_id: Uuid) -> Result<Option<Claim>> {
    let id_str = encode_uuid(claim_id);
    let raw: Option<RawClaim> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CLAIM_COLUMNS} FROM claims c WHERE c.claim_id = ?1"),
              rusqlite::params![id_str],
              RawClaim::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawClaim::into_claim).transpose()
  }
}

// ─── PotluckStore impl ───────────────────────────────────────────────────────

impl PotluckStore for SqliteStore {
  type Error = crate::Error;

  // ── Events ────────────────────────────────────────────────────────────────

  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      event_id:   Uuid::new_v4(),
      slug:       input.slug,
      title:      input.title,
      host_name:  input.host_name,
      created_at: now(),
    };

    let id_str    = encode_uuid(event.event_id);
    let slug      = event.slug.clone();
    let title     = event.title.clone();
    let host_name = event.host_name.clone();
    let at_str    = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (event_id, slug, title, host_name, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, slug, title, host_name, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| match Error::from(e) {
        e if e.is_unique_violation() => Error::SlugTaken(event.slug.clone()),
        e => e,
      })?;

    Ok(event)
  }

  async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
    // Out-of-range values clamp to "everything" / "past the end".
    let limit  = i64::try_from(query.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM events
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit, offset], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
    let slug = slug.to_owned();

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EVENT_COLUMNS} FROM events WHERE slug = ?1"),
              rusqlite::params![slug],
              RawEvent::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn delete_event(&self, event_id: Uuid) -> Result<bool> {
    self.delete_by_id("DELETE FROM events WHERE event_id = ?1", event_id).await
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn add_item(&self, input: NewItem) -> Result<Item> {
    let item = Item {
      item_id:       Uuid::new_v4(),
      event_id:      input.event_id,
      label:         input.label,
      requested_qty: input.requested_qty,
      created_by:    input.created_by,
      created_at:    now(),
    };

    let id_str       = encode_uuid(item.item_id);
    let event_id_str = encode_uuid(item.event_id);
    let label        = item.label.clone();
    let qty          = i64::from(item.requested_qty);
    let created_by   = item.created_by.clone();
    let at_str       = encode_dt(item.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO items (item_id, event_id, label, requested_qty, created_by, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, event_id_str, label, qty, created_by, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| match Error::from(e) {
        e if e.is_foreign_key_violation() => Error::EventNotFound(item.event_id),
        e => e,
      })?;

    Ok(item)
  }

  async fn list_items(&self, event_id: Uuid) -> Result<Vec<Item>> {
    let event_id_str = encode_uuid(event_id);

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ITEM_COLUMNS} FROM items
           WHERE event_id = ?1
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![event_id_str], RawItem::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn delete_item(&self, item_id: Uuid) -> Result<bool> {
    self.delete_by_id("DELETE FROM items WHERE item_id = ?1", item_id).await
  }

  // ── Claims ────────────────────────────────────────────────────────────────

  async fn add_claim(&self, input: NewClaim) -> Result<Claim> {
    let claim = Claim {
      claim_id:     Uuid::new_v4(),
      item_id:      input.item_id,
      claimer_name: input.claimer_name,
      qty:          input.qty,
      created_at:   now(),
    };

    let id_str      = encode_uuid(claim.claim_id);
    let item_id_str = encode_uuid(claim.item_id);
    let name        = claim.claimer_name.clone();
    let qty         = i64::from(claim.qty);
    let at_str      = encode_dt(claim.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO claims (claim_id, item_id, claimer_name, qty, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, item_id_str, name, qty, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| match Error::from(e) {
        e if e.is_foreign_key_violation() => Error::ItemNotFound(claim.item_id),
        e => e,
      })?;

    Ok(claim)
  }

  async fn list_claims(&self, event_id: Uuid) -> Result<Vec<Claim>> {
    let event_id_str = encode_uuid(event_id);

    let raws: Vec<RawClaim> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CLAIM_COLUMNS}
           FROM claims c
           JOIN items i ON i.item_id = c.item_id
           WHERE i.event_id = ?1
           ORDER BY c.created_at, c.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![event_id_str], RawClaim::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClaim::into_claim).collect()
  }

  async fn latest_claim(&self, item_id: Uuid, claimer_name: &str) -> Result<Option<Claim>> {
    let item_id_str = encode_uuid(item_id);
    let name        = claimer_name.to_owned();

    let raw: Option<RawClaim> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {CLAIM_COLUMNS} FROM claims c
                 WHERE c.item_id = ?1 AND c.claimer_name = ?2
                 ORDER BY c.created_at DESC, c.rowid DESC
                 LIMIT 1"
              ),
              rusqlite::params![item_id_str, name],
              RawClaim::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawClaim::into_claim).transpose()
  }

  async fn update_claim_qty(&self, claim_id: Uuid, qty: u32) -> Result<Option<Claim>> {
    let id_str = encode_uuid(claim_id);
    let qty    = i64::from(qty);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE claims SET qty = ?2 WHERE claim_id = ?1",
          rusqlite::params![id_str, qty],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_claim(claim_id).await
  }

  async fn delete_claim(&self, claim_id: Uuid) -> Result<bool> {
    self.delete_by_id("DELETE FROM claims WHERE claim_id = ?1", claim_id).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self) -> Result<Session> {
    let session = Session { session_id: Uuid::new_v4(), name: None, created_at: now() };

    let id_str = encode_uuid(session.session_id);
    let at_str = encode_dt(session.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (session_id, name, created_at) VALUES (?1, NULL, ?2)",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(session)
  }

  async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(session_id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?1"),
              rusqlite::params![id_str],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn set_session_name(&self, session_id: Uuid, name: &str) -> Result<Option<Session>> {
    let id_str = encode_uuid(session_id);
    let name   = name.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE sessions SET name = ?2 WHERE session_id = ?1",
          rusqlite::params![id_str, name],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_session(session_id).await
  }
}
