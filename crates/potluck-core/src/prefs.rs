//! Per-device preferences: the chosen display name, the auto-claim toggle,
//! and the remembered anonymous session.

use std::convert::Infallible;

use uuid::Uuid;

/// Local preference store. Values survive restarts on one device only.
pub trait Preferences {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The saved display name; `None` when unset or blank.
  fn name(&self) -> Option<String>;

  fn set_name(&mut self, name: &str) -> Result<(), Self::Error>;

  /// Whether a newly added item is claimed in full by its creator.
  /// Defaults to `true`.
  fn auto_claim(&self) -> bool;

  fn session_id(&self) -> Option<Uuid>;

  fn set_session_id(&mut self, session_id: Uuid) -> Result<(), Self::Error>;
}

/// In-process [`Preferences`] that forget everything on drop.
#[derive(Debug, Clone)]
pub struct MemoryPreferences {
  pub name:       Option<String>,
  pub auto_claim: bool,
  pub session_id: Option<Uuid>,
}

impl Default for MemoryPreferences {
  fn default() -> Self { Self { name: None, auto_claim: true, session_id: None } }
}

impl Preferences for MemoryPreferences {
  type Error = Infallible;

  fn name(&self) -> Option<String> {
    self.name.clone().filter(|n| !n.trim().is_empty())
  }

  fn set_name(&mut self, name: &str) -> Result<(), Infallible> {
    self.name = Some(name.trim().to_owned());
    Ok(())
  }

  fn auto_claim(&self) -> bool { self.auto_claim }

  fn session_id(&self) -> Option<Uuid> { self.session_id }

  fn set_session_id(&mut self, session_id: Uuid) -> Result<(), Infallible> {
    self.session_id = Some(session_id);
    Ok(())
  }
}
