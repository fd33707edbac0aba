//! potluck: command-line front end for a potluck server.
//!
//! Every command starts (or resumes) this device's anonymous session, then
//! talks to the server through the same planner the tests drive in-process.

mod app;
mod client;
mod prefs;
mod render;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use potluck_core::{Error as CoreError, event::EventDraft};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{
  app::App,
  client::{ApiClient, ApiConfig},
  prefs::FilePreferences,
};

const DEFAULT_URL: &str = "http://localhost:8080";

#[derive(Parser)]
#[command(author, version, about = "Coordinate who brings what to a potluck")]
struct Cli {
  /// Path to the preferences file.
  #[arg(long, env = "POTLUCK_CONFIG")]
  config: Option<PathBuf>,

  /// Server base URL; overrides the `url` saved in the preferences file.
  #[arg(long, env = "POTLUCK_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List events, newest first.
  Events {
    /// Zero-based page of results.
    #[arg(long, default_value_t = 0)]
    page:   usize,
    /// Only show events whose title or slug contains this text.
    #[arg(long)]
    search: Option<String>,
  },
  /// Create an event seeded with a few default items.
  New {
    title: String,
    #[arg(long)]
    host:  Option<String>,
    /// Use this slug instead of one derived from the title.
    #[arg(long)]
    slug:  Option<String>,
  },
  /// Show an event's items and who is bringing what.
  Show { slug: String },
  /// Add an item to an event.
  Add {
    slug:  String,
    label: String,
    /// How many are wanted; anything that is not a positive number means 1.
    #[arg(long)]
    qty:   Option<String>,
  },
  /// Bring one more of item number N.
  Claim { slug: String, n: usize },
  /// Bring one fewer of item number N.
  Unclaim { slug: String, n: usize },
  /// Delete item number N from an event.
  RmItem {
    slug: String,
    n:    usize,
    #[arg(long)]
    yes:  bool,
  },
  /// Delete an event with all its items and claims.
  RmEvent {
    id:  Uuid,
    #[arg(long)]
    yes: bool,
  },
  /// Print or set your display name.
  Name { name: Option<String> },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let prefs_path = cli.config.unwrap_or_else(FilePreferences::default_path);
  let prefs = FilePreferences::load(&prefs_path)
    .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))?;

  let base_url = cli
    .url
    .or_else(|| prefs.url().map(str::to_owned))
    .unwrap_or_else(|| DEFAULT_URL.to_owned());
  tracing::debug!(%base_url, "using server");
  let client = ApiClient::new(ApiConfig { base_url })?;

  let mut app = App::new(client, prefs);
  app.bootstrap().await?;

  match run(&mut app, cli.command).await {
    Ok(()) => Ok(ExitCode::SUCCESS),
    // Input the user can correct: say what is wrong, without an error chain.
    Err(e) if e.downcast_ref::<CoreError>().is_some_and(CoreError::is_validation) => {
      eprintln!("{e}");
      Ok(ExitCode::from(2))
    }
    Err(e) => Err(e),
  }
}

async fn run(app: &mut App, command: Command) -> Result<()> {
  match command {
    Command::Events { page, search } => app.list_events(page, search.as_deref()).await,
    Command::New { title, host, slug } => {
      let draft = EventDraft { title, host_name: host, custom_slug: slug };
      app.create_event(draft).await
    }
    Command::Show { slug } => app.show(&slug).await,
    Command::Add { slug, label, qty } => app.add_item(&slug, label, qty).await,
    Command::Claim { slug, n } => app.claim(&slug, n, true).await,
    Command::Unclaim { slug, n } => app.claim(&slug, n, false).await,
    Command::RmItem { slug, n, yes } => app.delete_item(&slug, n, yes).await,
    Command::RmEvent { id, yes } => app.delete_event(id, yes).await,
    Command::Name { name } => app.show_name(name).await,
  }
}
