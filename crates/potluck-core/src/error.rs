//! Error types for `potluck-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a display name is required")]
  EmptyName,

  #[error("an item label is required")]
  EmptyLabel,

  #[error("an event title is required")]
  EmptyTitle,

  #[error("the event link is empty after normalisation")]
  EmptySlug,

  #[error("the event link /e/{0} is already taken")]
  SlugTaken(String),

  /// The slug did not resolve. Clients treat this as a routing condition.
  #[error("event not found: {0}")]
  EventNotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("identity error: {0}")]
  Identity(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn identity<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Identity(Box::new(e))
  }

  /// Whether the user can fix the error by changing their input.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::EmptyName | Self::EmptyLabel | Self::EmptyTitle | Self::EmptySlug | Self::SlugTaken(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
