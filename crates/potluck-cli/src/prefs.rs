//! TOML-backed [`Preferences`]: the client's per-device settings file.
//!
//! ```toml
//! url        = "http://localhost:8080"
//! name       = "Alice"
//! auto_claim = true
//! session_id = "5b0c…"
//! ```

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use potluck_core::prefs::Preferences;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PrefsError {
  #[error("reading or writing {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("parsing {path}: {source}")]
  Parse {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("encoding preferences: {0}")]
  Encode(#[from] toml::ser::Error),
}

fn default_true() -> bool { true }

/// Shape of the preferences file. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PrefsFile {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  url:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  name:       Option<String>,
  #[serde(default = "default_true")]
  auto_claim: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  session_id: Option<Uuid>,
}

impl Default for PrefsFile {
  fn default() -> Self { Self { url: None, name: None, auto_claim: true, session_id: None } }
}

/// Preferences persisted to a TOML file; every setter writes through.
#[derive(Debug, Clone)]
pub struct FilePreferences {
  path: PathBuf,
  data: PrefsFile,
}

impl FilePreferences {
  /// `~/.config/potluck/config.toml`, or `config.toml` in the working
  /// directory when `HOME` is unset.
  pub fn default_path() -> PathBuf {
    match std::env::var_os("HOME") {
      Some(home) => PathBuf::from(home).join(".config/potluck/config.toml"),
      None => PathBuf::from("config.toml"),
    }
  }

  /// Load `path`; a missing file yields defaults.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
    let path = path.as_ref().to_path_buf();
    let data = match fs::read_to_string(&path) {
      Ok(raw) => toml::from_str(&raw).map_err(|source| PrefsError::Parse { path: path.clone(), source })?,
      Err(e) if e.kind() == io::ErrorKind::NotFound => PrefsFile::default(),
      Err(source) => return Err(PrefsError::Io { path, source }),
    };
    Ok(Self { path, data })
  }

  /// Server URL saved in the file, if any.
  pub fn url(&self) -> Option<&str> { self.data.url.as_deref().filter(|u| !u.is_empty()) }

  fn save(&self) -> Result<(), PrefsError> {
    let io_err = |source| PrefsError::Io { path: self.path.clone(), source };
    if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
      fs::create_dir_all(dir).map_err(io_err)?;
    }
    let raw = toml::to_string_pretty(&self.data)?;
    fs::write(&self.path, raw).map_err(io_err)
  }
}

impl Preferences for FilePreferences {
  type Error = PrefsError;

  fn name(&self) -> Option<String> {
    self.data.name.clone().filter(|n| !n.trim().is_empty())
  }

  fn set_name(&mut self, name: &str) -> Result<(), PrefsError> {
    self.data.name = Some(name.trim().to_owned());
    self.save()
  }

  fn auto_claim(&self) -> bool { self.data.auto_claim }

  fn session_id(&self) -> Option<Uuid> { self.data.session_id }

  fn set_session_id(&mut self, session_id: Uuid) -> Result<(), PrefsError> {
    self.data.session_id = Some(session_id);
    self.save()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scratch_path() -> PathBuf {
    std::env::temp_dir()
      .join(format!("potluck-prefs-{}", Uuid::new_v4()))
      .join("config.toml")
  }

  #[test]
  fn missing_file_gives_defaults() {
    let prefs = FilePreferences::load(scratch_path()).unwrap();
    assert!(prefs.auto_claim());
    assert_eq!(prefs.name(), None);
    assert_eq!(prefs.session_id(), None);
    assert_eq!(prefs.url(), None);
  }

  #[test]
  fn setters_persist_across_loads() {
    let path = scratch_path();
    let session = Uuid::new_v4();
    {
      let mut prefs = FilePreferences::load(&path).unwrap();
      prefs.set_name(" Alice ").unwrap();
      prefs.set_session_id(session).unwrap();
    }

    let prefs = FilePreferences::load(&path).unwrap();
    assert_eq!(prefs.name().as_deref(), Some("Alice"));
    assert_eq!(prefs.session_id(), Some(session));
    assert!(prefs.auto_claim());

    fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[test]
  fn auto_claim_can_be_disabled_in_the_file() {
    let path = scratch_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "auto_claim = false\nurl = \"http://potluck.lan\"\n").unwrap();

    let prefs = FilePreferences::load(&path).unwrap();
    assert!(!prefs.auto_claim());
    assert_eq!(prefs.url(), Some("http://potluck.lan"));

    fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[test]
  fn malformed_file_is_a_parse_error() {
    let path = scratch_path();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "auto_claim = \"maybe\"").unwrap();

    assert!(matches!(FilePreferences::load(&path), Err(PrefsError::Parse { .. })));

    fs::remove_dir_all(path.parent().unwrap()).ok();
  }
}
