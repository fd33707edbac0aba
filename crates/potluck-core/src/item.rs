//! Items: something an event needs, with an advisory target quantity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A requested dish or supply. `requested_qty` is a target only; claims may
/// fall short of it or exceed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub item_id:       Uuid,
  pub event_id:      Uuid,
  pub label:         String,
  pub requested_qty: u32,
  /// Display name of whoever added the item, as it was at creation time.
  pub created_by:    String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`PotluckStore::add_item`](crate::store::PotluckStore::add_item).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
  pub event_id:      Uuid,
  pub label:         String,
  pub requested_qty: u32,
  pub created_by:    String,
}

/// What a participant fills in to add an item to an event.
#[derive(Debug, Clone)]
pub struct ItemDraft {
  pub label:         String,
  /// Raw quantity text; see [`coerce_requested_qty`].
  pub requested_qty: Option<String>,
  pub creator_name:  String,
  /// Claim the whole requested quantity for the creator right away.
  pub auto_claim:    bool,
}

/// Interpret free-form quantity input.
///
/// Reads the leading integer of the trimmed text (so `"3 bottles"` is 3);
/// anything missing, unparsable, or below 1 becomes 1.
pub fn coerce_requested_qty(input: Option<&str>) -> u32 {
  let Some(text) = input.map(str::trim) else {
    return 1;
  };

  let (negative, digits) = match text.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, text.strip_prefix('+').unwrap_or(text)),
  };
  let end = digits
    .find(|c: char| !c.is_ascii_digit())
    .unwrap_or(digits.len());
  if negative || end == 0 {
    return 1;
  }

  // Digit strings too long for u32 saturate rather than fall back to 1.
  digits[..end].parse::<u32>().unwrap_or(u32::MAX).max(1)
}
