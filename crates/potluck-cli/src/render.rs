//! Plain-text rendering of the events list and an event page.

use std::fmt::Write as _;

use potluck_core::{event::Event, planner::Snapshot};

/// `Alice x2, Bob x1`, or `—` when nobody has claimed anything.
fn contributor_line<'a>(contributors: impl Iterator<Item = (&'a str, u32)>) -> String {
  let line = contributors
    .filter(|(_, qty)| *qty > 0)
    .map(|(name, qty)| format!("{name} x{qty}"))
    .collect::<Vec<_>>()
    .join(", ");
  if line.is_empty() { "—".to_owned() } else { line }
}

/// One event per line: title, link, host and creation time.
pub fn event_line(event: &Event) -> String {
  let mut line = format!("{}  /e/{}", event.title, event.slug);
  if let Some(host) = &event.host_name {
    let _ = write!(line, " • Host: {host}");
  }
  let _ = write!(line, " • {}", event.created_at.format("%Y-%m-%d %H:%M"));
  line
}

/// The event page: header, then numbered items with the viewer's own count,
/// everyone's contributions, and who added the item.
pub fn event_page(snapshot: &Snapshot, me: &str) -> String {
  let contributions = snapshot.contributions(me);
  let mut out = String::new();

  let _ = writeln!(out, "{}  (/e/{})", snapshot.event.title, snapshot.event.slug);
  let _ = writeln!(out, "You are: {me}");
  let _ = writeln!(out);

  if snapshot.items.is_empty() {
    let _ = writeln!(out, "No items yet.");
  }

  for (idx, item) in snapshot.items.iter().enumerate() {
    let added_by = if item.created_by.is_empty() { "—" } else { item.created_by.as_str() };
    let _ = writeln!(out, "{}. {}  (wanted: {})", idx + 1, item.label, item.requested_qty);
    let _ = writeln!(
      out,
      "   mine: {}   contributors: {}   added by: {}",
      contributions.mine(item.item_id),
      contributor_line(contributions.contributors(item.item_id)),
      added_by,
    );
  }

  out
}
