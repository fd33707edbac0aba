//! Command flows: what each subcommand asks of the planner and prints.

use std::{
  io::{self, BufRead as _, Write as _},
  sync::Arc,
};

use anyhow::{Context as _, Result, anyhow, bail};
use potluck_core::{
  Error as CoreError,
  event::EventDraft,
  identity::{IdentityBootstrap as _, LocalIdentity},
  item::{Item, ItemDraft},
  planner::{Planner, Snapshot},
  prefs::Preferences as _,
};
use uuid::Uuid;

use crate::{client::ApiClient, prefs::FilePreferences, render};

/// The client-side view layer: one planner plus this device's preferences.
pub struct App {
  planner: Planner<ApiClient, LocalIdentity<ApiClient>>,
  prefs:   FilePreferences,
}

impl App {
  pub fn new(client: ApiClient, prefs: FilePreferences) -> Self {
    let client = Arc::new(client);
    let identity = LocalIdentity::with_session(client.clone(), prefs.session_id());
    Self { planner: Planner::new(client, identity), prefs }
  }

  /// Make sure this device has an anonymous session and remember it.
  pub async fn bootstrap(&mut self) -> Result<()> {
    let session = self
      .planner
      .identity()
      .ensure_session()
      .await
      .context("starting anonymous session")?;
    if self.prefs.session_id() != Some(session.session_id) {
      self.prefs.set_session_id(session.session_id)?;
    }
    Ok(())
  }

  // ── Name ──────────────────────────────────────────────────────────────────

  /// Save `name` locally and attach it to the session.
  pub async fn set_name(&mut self, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
      bail!(CoreError::EmptyName);
    }
    self.prefs.set_name(name)?;
    self.planner.identity().attach_name(name).await?;
    Ok(name.to_owned())
  }

  /// The saved display name, asking for one if there is none yet.
  async fn require_name(&mut self) -> Result<String> {
    if let Some(name) = self.prefs.name() {
      return Ok(name);
    }
    loop {
      let answer = prompt("What's your name? ")?;
      if !answer.trim().is_empty() {
        return self.set_name(&answer).await;
      }
    }
  }

  pub async fn show_name(&mut self, name: Option<String>) -> Result<()> {
    match name {
      Some(name) => println!("Name set to {}", self.set_name(&name).await?),
      None => match self.prefs.name() {
        Some(name) => println!("{name}"),
        None => println!("No name set yet."),
      },
    }
    Ok(())
  }

  // ── Events ────────────────────────────────────────────────────────────────

  pub async fn list_events(&self, page: usize, search: Option<&str>) -> Result<()> {
    let listing = self.planner.list_events(page).await?;
    let query = search.unwrap_or_default();
    let shown: Vec<_> = listing.events.iter().filter(|e| e.matches(query)).collect();

    if shown.is_empty() {
      println!("No events yet. Create one with `potluck new <title>`.");
    }
    for event in shown {
      println!("{}  [{}]", render::event_line(event), event.event_id);
    }
    if listing.has_more {
      println!("More: potluck events --page {}", page.saturating_add(1));
    }
    Ok(())
  }

  pub async fn create_event(&self, draft: EventDraft) -> Result<()> {
    let event = self.planner.create_event(draft).await?;
    println!("Created /e/{}", event.slug);
    Ok(())
  }

  pub async fn delete_event(&self, event_id: Uuid, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete event {event_id} and everything in it?"))? {
      return Ok(());
    }
    if self.planner.delete_event(event_id).await? {
      println!("Deleted.");
    } else {
      println!("No such event.");
    }
    Ok(())
  }

  // ── Event page ────────────────────────────────────────────────────────────

  /// Load an event; an unknown slug falls back to the events list.
  async fn open(&self, slug: &str) -> Result<Option<Snapshot>> {
    match self.planner.load(slug).await {
      Ok(snapshot) => Ok(Some(snapshot)),
      Err(CoreError::EventNotFound(_)) => {
        println!("No event at /e/{slug}. Known events:");
        self.list_events(0, None).await?;
        Ok(None)
      }
      Err(e) => Err(e.into()),
    }
  }

  fn print(&self, snapshot: &Snapshot, me: &str) { print!("{}", render::event_page(snapshot, me)); }

  pub async fn show(&mut self, slug: &str) -> Result<()> {
    let me = self.require_name().await?;
    if let Some(snapshot) = self.open(slug).await? {
      self.print(&snapshot, &me);
    }
    Ok(())
  }

  pub async fn add_item(&mut self, slug: &str, label: String, qty: Option<String>) -> Result<()> {
    let me = self.require_name().await?;
    let Some(snapshot) = self.open(slug).await? else { return Ok(()) };

    let draft = ItemDraft {
      label,
      requested_qty: qty,
      creator_name: me.clone(),
      auto_claim: self.prefs.auto_claim(),
    };
    let snapshot = self.planner.add_item(&snapshot, draft).await?;
    self.print(&snapshot, &me);
    Ok(())
  }

  pub async fn claim(&mut self, slug: &str, number: usize, more: bool) -> Result<()> {
    let me = self.require_name().await?;
    let Some(snapshot) = self.open(slug).await? else { return Ok(()) };
    let item_id = nth_item(&snapshot, number)?.item_id;

    let snapshot = if more {
      self.planner.increment(&snapshot, item_id, &me).await?
    } else {
      self.planner.decrement(&snapshot, item_id, &me).await?
    };
    self.print(&snapshot, &me);
    Ok(())
  }

  pub async fn delete_item(&mut self, slug: &str, number: usize, yes: bool) -> Result<()> {
    let me = self.require_name().await?;
    let Some(snapshot) = self.open(slug).await? else { return Ok(()) };
    let item = nth_item(&snapshot, number)?;

    if !yes && !confirm(&format!("Delete \"{}\"?", item.label))? {
      return Ok(());
    }
    let snapshot = self.planner.delete_item(&snapshot, item.item_id).await?;
    self.print(&snapshot, &me);
    Ok(())
  }
}

/// Items are numbered from 1 on the event page.
fn nth_item(snapshot: &Snapshot, number: usize) -> Result<&Item> {
  number
    .checked_sub(1)
    .and_then(|idx| snapshot.items.get(idx))
    .ok_or_else(|| anyhow!("no item #{number} on /e/{}", snapshot.event.slug))
}

fn prompt(question: &str) -> Result<String> {
  print!("{question}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line).context("reading stdin")?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}

fn confirm(question: &str) -> Result<bool> {
  let answer = prompt(&format!("{question} [y/N] "))?;
  Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
