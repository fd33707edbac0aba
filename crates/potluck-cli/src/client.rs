//! Async HTTP client wrapping the potluck JSON API.
//!
//! [`ApiClient`] implements [`PotluckStore`], so the planner runs unchanged
//! against a remote server.

use std::{
  sync::{Arc, PoisonError, RwLock},
  time::Duration,
};

use potluck_core::{
  claim::{Claim, NewClaim},
  event::{Event, NewEvent},
  identity::Session,
  item::{Item, NewItem},
  store::{EventQuery, PotluckStore, Rejection, StoreError},
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid server url {0:?}")]
  BadUrl(String),

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}: {message}")]
  Status {
    method:  Method,
    path:    String,
    status:  StatusCode,
    message: String,
  },
}

impl StoreError for Error {
  fn rejection(&self) -> Option<Rejection> {
    match self {
      Self::Status { status: StatusCode::CONFLICT, .. } => Some(Rejection::Conflict),
      Self::Status { status: StatusCode::BAD_REQUEST, .. } => Some(Rejection::Invalid),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Connection settings for the potluck API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Error body produced by `potluck-api`.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Deserialize)]
struct Deleted {
  deleted: bool,
}

/// Async HTTP client for the potluck JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based. Writes are
/// authorised with the session this client last created or looked up.
#[derive(Clone)]
pub struct ApiClient {
  client:  Client,
  base:    Url,
  session: Arc<RwLock<Option<Uuid>>>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url)
      .ok()
      .filter(|u| !u.cannot_be_a_base())
      .ok_or_else(|| Error::BadUrl(config.base_url.clone()))?;
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base, session: Arc::new(RwLock::new(None)) })
  }

  /// `<base>/api/<segments...>`, each segment percent-encoded.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().push("api").extend(segments);
    }
    url
  }

  fn adopt(&self, session_id: Uuid) {
    *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session_id);
  }

  fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
    let req = self.client.request(method, self.url(segments));
    match *self.session.read().unwrap_or_else(PoisonError::into_inner) {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn send(
    &self,
    method: Method,
    segments: &[&str],
    build: impl FnOnce(RequestBuilder) -> RequestBuilder,
  ) -> Result<Response> {
    let resp = build(self.request(method.clone(), segments)).send().await?;
    if resp.status().is_success() {
      return Ok(resp);
    }
    let status = resp.status();
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|b| b.error)
      .unwrap_or_else(|_| status.canonical_reason().unwrap_or_default().to_owned());
    Err(Error::Status { method, path: format!("/{}", segments.join("/")), status, message })
  }

  async fn json<T: DeserializeOwned>(
    &self,
    method: Method,
    segments: &[&str],
    build: impl FnOnce(RequestBuilder) -> RequestBuilder,
  ) -> Result<T> {
    Ok(self.send(method, segments, build).await?.json().await?)
  }

  /// Like [`Self::json`], but a 404 reads as `None`.
  async fn optional<T: DeserializeOwned>(
    &self,
    method: Method,
    segments: &[&str],
    build: impl FnOnce(RequestBuilder) -> RequestBuilder,
  ) -> Result<Option<T>> {
    match self.json(method, segments, build).await {
      Ok(v) => Ok(Some(v)),
      Err(Error::Status { status: StatusCode::NOT_FOUND, .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn delete(&self, segments: &[&str]) -> Result<bool> {
    let body: Deleted = self.json(Method::DELETE, segments, |r| r).await?;
    Ok(body.deleted)
  }
}

// ─── PotluckStore impl ───────────────────────────────────────────────────────

impl PotluckStore for ApiClient {
  type Error = Error;

  // ── Events ────────────────────────────────────────────────────────────────

  /// `POST /api/events`
  async fn create_event(&self, input: NewEvent) -> Result<Event> {
    self.json(Method::POST, &["events"], |r| r.json(&input)).await
  }

  /// `GET /api/events?offset=..&limit=..`
  async fn list_events(&self, query: EventQuery) -> Result<Vec<Event>> {
    self
      .json(Method::GET, &["events"], |r| {
        r.query(&[("offset", query.offset), ("limit", query.limit)])
      })
      .await
  }

  /// `GET /api/events/by-slug/<slug>`
  async fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>> {
    self.optional(Method::GET, &["events", "by-slug", slug], |r| r).await
  }

  /// `DELETE /api/events/<id>`
  async fn delete_event(&self, event_id: Uuid) -> Result<bool> {
    self.delete(&["events", &event_id.to_string()]).await
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  /// `POST /api/items`
  async fn add_item(&self, input: NewItem) -> Result<Item> {
    self.json(Method::POST, &["items"], |r| r.json(&input)).await
  }

  /// `GET /api/events/<id>/items`
  async fn list_items(&self, event_id: Uuid) -> Result<Vec<Item>> {
    self.json(Method::GET, &["events", &event_id.to_string(), "items"], |r| r).await
  }

  /// `DELETE /api/items/<id>`
  async fn delete_item(&self, item_id: Uuid) -> Result<bool> {
    self.delete(&["items", &item_id.to_string()]).await
  }

  // ── Claims ────────────────────────────────────────────────────────────────

  /// `POST /api/claims`
  async fn add_claim(&self, input: NewClaim) -> Result<Claim> {
    self.json(Method::POST, &["claims"], |r| r.json(&input)).await
  }

  /// `GET /api/events/<id>/claims`
  async fn list_claims(&self, event_id: Uuid) -> Result<Vec<Claim>> {
    self.json(Method::GET, &["events", &event_id.to_string(), "claims"], |r| r).await
  }

  /// `GET /api/claims/latest?item_id=..&claimer_name=..`
  async fn latest_claim(&self, item_id: Uuid, claimer_name: &str) -> Result<Option<Claim>> {
    let item_id = item_id.to_string();
    self
      .json(Method::GET, &["claims", "latest"], |r| {
        r.query(&[("item_id", item_id.as_str()), ("claimer_name", claimer_name)])
      })
      .await
  }

  /// `PATCH /api/claims/<id>`
  async fn update_claim_qty(&self, claim_id: Uuid, qty: u32) -> Result<Option<Claim>> {
    self
      .optional(Method::PATCH, &["claims", &claim_id.to_string()], |r| {
        r.json(&json!({ "qty": qty }))
      })
      .await
  }

  /// `DELETE /api/claims/<id>`
  async fn delete_claim(&self, claim_id: Uuid) -> Result<bool> {
    self.delete(&["claims", &claim_id.to_string()]).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// `POST /api/sessions`
  async fn create_session(&self) -> Result<Session> {
    let session: Session = self.json(Method::POST, &["sessions"], |r| r).await?;
    self.adopt(session.session_id);
    Ok(session)
  }

  /// `GET /api/sessions/<id>`
  async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>> {
    let session: Option<Session> = self
      .optional(Method::GET, &["sessions", &session_id.to_string()], |r| r)
      .await?;
    if let Some(s) = &session {
      self.adopt(s.session_id);
    }
    Ok(session)
  }

  /// `PUT /api/sessions/<id>/name`
  async fn set_session_name(&self, session_id: Uuid, name: &str) -> Result<Option<Session>> {
    self
      .optional(Method::PUT, &["sessions", &session_id.to_string(), "name"], |r| {
        r.json(&json!({ "name": name }))
      })
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> ApiClient {
    ApiClient::new(ApiConfig { base_url: base.into() }).unwrap()
  }

  #[test]
  fn urls_are_nested_under_api() {
    let c = client("http://localhost:8080");
    assert_eq!(c.url(&["events"]).as_str(), "http://localhost:8080/api/events");

    let c = client("http://example.com/potluck/");
    assert_eq!(
      c.url(&["events", "by-slug", "cuma"]).as_str(),
      "http://example.com/potluck/api/events/by-slug/cuma"
    );
  }

  #[test]
  fn path_segments_are_escaped() {
    let c = client("http://localhost:8080");
    assert_eq!(
      c.url(&["events", "by-slug", "a/b c"]).as_str(),
      "http://localhost:8080/api/events/by-slug/a%2Fb%20c"
    );
  }

  #[test]
  fn rejects_unusable_base_urls() {
    assert!(matches!(
      ApiClient::new(ApiConfig { base_url: "not a url".into() }),
      Err(Error::BadUrl(_))
    ));
    assert!(matches!(
      ApiClient::new(ApiConfig { base_url: "mailto:me@example.com".into() }),
      Err(Error::BadUrl(_))
    ));
  }

  #[test]
  fn conflict_and_bad_request_are_rejections() {
    let status = |status| Error::Status {
      method:  Method::POST,
      path:    "/events".into(),
      status,
      message: String::new(),
    };
    assert_eq!(status(StatusCode::CONFLICT).rejection(), Some(Rejection::Conflict));
    assert_eq!(status(StatusCode::BAD_REQUEST).rejection(), Some(Rejection::Invalid));
    assert_eq!(status(StatusCode::INTERNAL_SERVER_ERROR).rejection(), None);
    assert_eq!(Error::BadUrl("x".into()).rejection(), None);
  }
}
