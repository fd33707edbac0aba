//! Claims: a pledge by one contributor of some quantity of an item.
//!
//! A contributor may own several claim rows on the same item. Rows are never
//! merged; the reconciler only ever touches the newest one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
  pub claim_id:     Uuid,
  pub item_id:      Uuid,
  /// Display name of the contributor. Compared by exact string equality.
  pub claimer_name: String,
  /// Always at least 1 while the row exists.
  pub qty:          u32,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`PotluckStore::add_claim`](crate::store::PotluckStore::add_claim).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClaim {
  pub item_id:      Uuid,
  pub claimer_name: String,
  pub qty:          u32,
}
