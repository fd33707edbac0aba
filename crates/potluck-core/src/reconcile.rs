//! Claim reconciliation: turning a contributor's `+` / `−` into row writes.
//!
//! Each increment inserts a fresh one-unit row. A decrement only ever touches
//! the newest row of that contributor on that item: it loses one unit, or is
//! deleted when it holds the last one. No operation reads or rewrites the
//! contributor's other rows, so every write is a single-row statement.

use uuid::Uuid;

use crate::{
  Error, Result,
  claim::{Claim, NewClaim},
  store::PotluckStore,
};

/// The row-level effect of one reconcile step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimChange {
  /// A new row was inserted.
  Added(Claim),
  /// The newest row now holds one unit less.
  Reduced(Claim),
  /// The newest row held a single unit and was deleted.
  Removed(Uuid),
  /// Nothing to decrement, or the row was already gone when we got to it.
  Unchanged,
}

fn claimer(name: &str) -> Result<&str> {
  let name = name.trim();
  if name.is_empty() { Err(Error::EmptyName) } else { Ok(name) }
}

/// Add one unit for `claimer_name` on `item_id` as a new claim row.
pub async fn increment<S: PotluckStore>(
  store: &S,
  item_id: Uuid,
  claimer_name: &str,
) -> Result<ClaimChange> {
  let claimer_name = claimer(claimer_name)?;

  let claim = store
    .add_claim(NewClaim { item_id, claimer_name: claimer_name.to_owned(), qty: 1 })
    .await
    .map_err(Error::store)?;

  tracing::debug!(%item_id, claim_id = %claim.claim_id, claimer = claimer_name, "claim added");
  Ok(ClaimChange::Added(claim))
}

/// Take one unit away from the newest claim row of `claimer_name` on
/// `item_id`. A claimer with no rows is left alone.
pub async fn decrement<S: PotluckStore>(
  store: &S,
  item_id: Uuid,
  claimer_name: &str,
) -> Result<ClaimChange> {
  let claimer_name = claimer(claimer_name)?;

  let Some(last) = store
    .latest_claim(item_id, claimer_name)
    .await
    .map_err(Error::store)?
  else {
    return Ok(ClaimChange::Unchanged);
  };

  if last.qty > 1 {
    let updated = store
      .update_claim_qty(last.claim_id, last.qty - 1)
      .await
      .map_err(Error::store)?;
    return Ok(match updated {
      Some(claim) => {
        tracing::debug!(%item_id, claim_id = %claim.claim_id, qty = claim.qty, "claim reduced");
        ClaimChange::Reduced(claim)
      }
      None => {
        tracing::debug!(%item_id, claim_id = %last.claim_id, "claim vanished before update");
        ClaimChange::Unchanged
      }
    });
  }

  let deleted = store.delete_claim(last.claim_id).await.map_err(Error::store)?;
  if deleted {
    tracing::debug!(%item_id, claim_id = %last.claim_id, "claim removed");
    Ok(ClaimChange::Removed(last.claim_id))
  } else {
    tracing::debug!(%item_id, claim_id = %last.claim_id, "claim already removed");
    Ok(ClaimChange::Unchanged)
  }
}
