//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! so that lexical order equals chronological order. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use potluck_core::{claim::Claim, event::Event, identity::Session, item::Item};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Quantities ───────────────────────────────────────────────────────────────

pub fn decode_qty(n: i64) -> Result<u32> { u32::try_from(n).map_err(|_| Error::Quantity(n)) }

// ─── Raw row types ────────────────────────────────────────────────────────────

pub const EVENT_COLUMNS: &str = "event_id, slug, title, host_name, created_at";

/// Event row as read from SQLite.
pub struct RawEvent {
  pub event_id:   String,
  pub slug:       String,
  pub title:      String,
  pub host_name:  Option<String>,
  pub created_at: String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      slug:       row.get(1)?,
      title:      row.get(2)?,
      host_name:  row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:   decode_uuid(&self.event_id)?,
      slug:       self.slug,
      title:      self.title,
      host_name:  self.host_name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const ITEM_COLUMNS: &str = "item_id, event_id, label, requested_qty, created_by, created_at";

pub struct RawItem {
  pub item_id:       String,
  pub event_id:      String,
  pub label:         String,
  pub requested_qty: i64,
  pub created_by:    String,
  pub created_at:    String,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:       row.get(0)?,
      event_id:      row.get(1)?,
      label:         row.get(2)?,
      requested_qty: row.get(3)?,
      created_by:    row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      item_id:       decode_uuid(&self.item_id)?,
      event_id:      decode_uuid(&self.event_id)?,
      label:         self.label,
      requested_qty: decode_qty(self.requested_qty)?,
      created_by:    self.created_by,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Claim columns qualified with the `c` alias used by joined queries.
pub const CLAIM_COLUMNS: &str = "c.claim_id, c.item_id, c.claimer_name, c.qty, c.created_at";

pub struct RawClaim {
  pub claim_id:     String,
  pub item_id:      String,
  pub claimer_name: String,
  pub qty:          i64,
  pub created_at:   String,
}

impl RawClaim {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      claim_id:     row.get(0)?,
      item_id:      row.get(1)?,
      claimer_name: row.get(2)?,
      qty:          row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_claim(self) -> Result<Claim> {
    Ok(Claim {
      claim_id:     decode_uuid(&self.claim_id)?,
      item_id:      decode_uuid(&self.item_id)?,
      claimer_name: self.claimer_name,
      qty:          decode_qty(self.qty)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub const SESSION_COLUMNS: &str = "session_id, name, created_at";

pub struct RawSession {
  pub session_id: String,
  pub name:       Option<String>,
  pub created_at: String,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id: row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_id: decode_uuid(&self.session_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
