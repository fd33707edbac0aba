//! Events: the shareable page that items and claims hang off.
//!
//! An event is created once by its host and never edited afterwards; it can
//! only be deleted, which takes its items and claims with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A potluck event, addressed in links by its unique `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:   Uuid,
  pub slug:       String,
  pub title:      String,
  pub host_name:  Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Event {
  /// Case-insensitive substring match over the title and slug, as used by
  /// the events list filter. An empty query matches everything.
  pub fn matches(&self, query: &str) -> bool {
    if query.is_empty() {
      return true;
    }
    let haystack = format!("{} {}", self.title, self.slug).to_lowercase();
    haystack.contains(&query.to_lowercase())
  }
}

/// Input to [`PotluckStore::create_event`](crate::store::PotluckStore::create_event).
/// `event_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
  pub slug:      String,
  pub title:     String,
  pub host_name: Option<String>,
}

/// What a host fills in to create an event.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
  pub title:       String,
  pub host_name:   Option<String>,
  /// Overrides the slug derived from the title when non-empty.
  pub custom_slug: Option<String>,
}

impl EventDraft {
  /// The slug this draft will be published under.
  pub fn slug(&self) -> String {
    match self.custom_slug.as_deref().filter(|s| !s.trim().is_empty()) {
      Some(custom) => slugify(custom),
      None => slugify(&self.title),
    }
  }
}

/// Items every new event starts with, as `(label, requested_qty)`.
pub const DEFAULT_ITEMS: &[(&str, u32)] = &[
  ("Salata", 1),
  ("Tatlı", 1),
  ("İçecek (2L)", 2),
  ("Atıştırmalık", 2),
];

/// Turn free text into a URL path segment.
///
/// Lowercases, folds Turkish letters to ASCII, and collapses every other run
/// of non-alphanumeric characters into a single `-`.
pub fn slugify(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut pending_dash = false;

  for c in input.chars().flat_map(char::to_lowercase) {
    let folded = match c {
      'ç' => 'c',
      'ğ' => 'g',
      'ı' => 'i',
      'ö' => 'o',
      'ş' => 's',
      'ü' => 'u',
      other => other,
    };
    if folded.is_ascii_alphanumeric() {
      if pending_dash && !out.is_empty() {
        out.push('-');
      }
      pending_dash = false;
      out.push(folded);
    } else if folded == '\u{307}' {
      // Combining dot left behind by lowercasing 'İ'.
      continue;
    } else {
      pending_dash = true;
    }
  }

  out
}
