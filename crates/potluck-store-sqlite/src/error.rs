//! Error type for `potluck-store-sqlite`.

use potluck_core::store::{Rejection, StoreError};
use rusqlite::{
  ErrorCode,
  ffi::{SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_UNIQUE},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("quantity out of range: {0}")]
  Quantity(i64),

  #[error("slug {0:?} is already taken")]
  SlugTaken(String),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  #[error("item not found: {0}")]
  ItemNotFound(Uuid),
}

impl Error {
  /// The extended result code of a failed constraint, if that is what this
  /// error is.
  pub(crate) fn constraint(&self) -> Option<i32> {
    match self {
      Self::Database(tokio_rusqlite::Error::Rusqlite(e)) => e
        .sqlite_error()
        .filter(|f| f.code == ErrorCode::ConstraintViolation)
        .map(|f| f.extended_code),
      _ => None,
    }
  }

  pub(crate) fn is_unique_violation(&self) -> bool {
    self.constraint() == Some(SQLITE_CONSTRAINT_UNIQUE)
  }

  pub(crate) fn is_foreign_key_violation(&self) -> bool {
    self.constraint() == Some(SQLITE_CONSTRAINT_FOREIGNKEY)
  }
}

impl StoreError for Error {
  fn rejection(&self) -> Option<Rejection> {
    match self {
      Self::SlugTaken(_) => Some(Rejection::Conflict),
      Self::EventNotFound(_) | Self::ItemNotFound(_) => Some(Rejection::Invalid),
      // CHECK and any other constraint not translated above.
      _ if self.constraint().is_some() => Some(Rejection::Invalid),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
