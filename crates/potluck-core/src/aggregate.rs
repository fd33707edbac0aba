//! Contribution aggregation, the derived, never-stored view of who is
//! bringing how much of each item.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::{claim::Claim, item::Item};

/// Per-item totals derived from an item list and a claim list.
///
/// Every item of the input is a key of both maps, even with no claims.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributions {
  /// The current user's total claimed quantity per item.
  pub mine:     HashMap<Uuid, u32>,
  /// Total claimed quantity per contributor name, per item.
  pub contribs: HashMap<Uuid, BTreeMap<String, u32>>,
}

impl Contributions {
  /// The current user's total for `item_id`; 0 for unknown items.
  pub fn mine(&self, item_id: Uuid) -> u32 { self.mine.get(&item_id).copied().unwrap_or(0) }

  /// Contributor totals for `item_id`, ordered by name.
  pub fn contributors(&self, item_id: Uuid) -> impl Iterator<Item = (&str, u32)> {
    self
      .contribs
      .get(&item_id)
      .into_iter()
      .flatten()
      .filter(|(_, qty)| **qty > 0)
      .map(|(name, qty)| (name.as_str(), *qty))
  }

  /// Sum over all contributors for `item_id`.
  pub fn total(&self, item_id: Uuid) -> u32 {
    self.contributors(item_id).map(|(_, qty)| qty).sum()
  }
}

/// Group `claims` by item and claimer name and sum their quantities.
///
/// Names are compared by exact string equality, so `"Alice"` and `"alice "`
/// are different contributors. Claims on items missing from `items` are
/// ignored. An empty `current_name` owns nothing.
pub fn aggregate(items: &[Item], claims: &[Claim], current_name: &str) -> Contributions {
  let mut out = Contributions {
    mine:     items.iter().map(|it| (it.item_id, 0)).collect(),
    contribs: items.iter().map(|it| (it.item_id, BTreeMap::new())).collect(),
  };

  for claim in claims {
    let Some(bag) = out.contribs.get_mut(&claim.item_id) else {
      continue;
    };
    let total = bag.entry(claim.claimer_name.clone()).or_insert(0);
    *total = total.saturating_add(claim.qty);

    if !current_name.is_empty()
      && claim.claimer_name == current_name
      && let Some(mine) = out.mine.get_mut(&claim.item_id)
    {
      *mine = mine.saturating_add(claim.qty);
    }
  }

  out
}
