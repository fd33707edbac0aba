//! Anonymous identity bootstrap.
//!
//! Every client needs an authenticated (if anonymous) session before writing,
//! and the store's access rules may consult the display name attached to it.

use std::{
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::PotluckStore};

/// An anonymous identity. The `session_id` doubles as the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub session_id: Uuid,
  pub name:       Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Makes sure the current client has a session and can label it with a name.
pub trait IdentityBootstrap: Send + Sync {
  /// Idempotent: returns the existing session, creating one only if none
  /// exists yet (or the remembered one is gone).
  fn ensure_session(&self) -> impl Future<Output = Result<Session>> + Send + '_;

  /// Ensure a session, then attach `name` to it.
  fn attach_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Session>> + Send + 'a;
}

// ─── Store-backed implementation ─────────────────────────────────────────────

/// [`IdentityBootstrap`] over a [`PotluckStore`]'s session table.
///
/// Remembers the session it resolved so later calls reuse it; callers that
/// persist identity across runs seed it with [`LocalIdentity::with_session`]
/// and save [`LocalIdentity::current`] afterwards.
pub struct LocalIdentity<S> {
  store:   Arc<S>,
  current: Mutex<Option<Uuid>>,
}

impl<S: PotluckStore> LocalIdentity<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_session(store, None) }

  pub fn with_session(store: Arc<S>, session_id: Option<Uuid>) -> Self {
    Self { store, current: Mutex::new(session_id) }
  }

  /// The session id resolved most recently, if any.
  pub fn current(&self) -> Option<Uuid> {
    *self.current.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn remember(&self, session_id: Option<Uuid>) {
    *self.current.lock().unwrap_or_else(PoisonError::into_inner) = session_id;
  }
}

impl<S: PotluckStore> IdentityBootstrap for LocalIdentity<S> {
  async fn ensure_session(&self) -> Result<Session> {
    if let Some(id) = self.current() {
      if let Some(session) = self.store.get_session(id).await.map_err(Error::identity)? {
        return Ok(session);
      }
      tracing::info!(session_id = %id, "remembered session no longer exists, starting a new one");
    }

    let session = self.store.create_session().await.map_err(Error::identity)?;
    tracing::debug!(session_id = %session.session_id, "created anonymous session");
    self.remember(Some(session.session_id));
    Ok(session)
  }

  async fn attach_name(&self, name: &str) -> Result<Session> {
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::EmptyName);
    }

    let session = self.ensure_session().await?;
    if session.name.as_deref() == Some(name) {
      return Ok(session);
    }

    match self
      .store
      .set_session_name(session.session_id, name)
      .await
      .map_err(Error::identity)?
    {
      Some(updated) => Ok(updated),
      None => {
        self.remember(None);
        Err(Error::Identity(
          format!("session {} disappeared while attaching a name", session.session_id).into(),
        ))
      }
    }
  }
}
