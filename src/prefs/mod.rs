//! User preference storage.
//!
//! A singleton settings record (display name, accent color, optional app
//! PIN) persisted as one JSON document. Reads are served from an in-memory
//! live value; writes replace the whole record on disk atomically (temp file
//! plus rename) before publishing, so observers only ever see persisted
//! state. Last write wins; there is no history.

use crate::constants::{DEFAULT_ACCENT_COLOR, DEFAULT_USER_NAME};
use crate::errors::{AppResult, PreferencesError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{debug, warn};

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

fn default_accent_color() -> String {
    DEFAULT_ACCENT_COLOR.to_string()
}

/// The singleton preferences record.
///
/// Fields absent from the file take their defaults, so a partial or missing
/// document still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Display name shown on the home surface.
    #[serde(default = "default_user_name")]
    pub user_name: String,
    /// Accent color hex string.
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    /// The app lock PIN, when one has been configured.
    ///
    /// Stored in the clear: the lock is a UI gate, not data protection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        UserPreferences {
            user_name: default_user_name(),
            accent_color: default_accent_color(),
            pin: None,
        }
    }
}

/// Durable store for [`UserPreferences`] with live-value reads.
pub struct PreferenceStore {
    path: PathBuf,
    state: watch::Sender<UserPreferences>,
}

impl PreferenceStore {
    /// Opens the store, loading the file at `path` if present.
    ///
    /// A missing file yields defaults; the record is created implicitly on
    /// the first write. An unreadable or malformed file is an error rather
    /// than silent data loss.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: PathBuf) -> AppResult<Self> {
        let prefs = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| PreferencesError::Parse {
                path: path.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences file at {:?}, using defaults", path);
                UserPreferences::default()
            }
            Err(e) => {
                return Err(PreferencesError::Read {
                    path: path.clone(),
                    source: e,
                }
                .into())
            }
        };

        Ok(PreferenceStore {
            path,
            state: watch::channel(prefs).0,
        })
    }

    /// The current preferences snapshot.
    pub fn current(&self) -> UserPreferences {
        self.state.borrow().clone()
    }

    /// A receiver that observes every future preferences write.
    pub fn subscribe(&self) -> watch::Receiver<UserPreferences> {
        self.state.subscribe()
    }

    /// Saves the display name, trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the record fails.
    pub fn save_user_name(&self, name: &str) -> AppResult<()> {
        let mut prefs = self.current();
        prefs.user_name = name.trim().to_string();
        self.persist(prefs)
    }

    /// Saves the accent color hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the record fails.
    pub fn save_accent_color(&self, color: &str) -> AppResult<()> {
        let mut prefs = self.current();
        prefs.accent_color = color.to_string();
        self.persist(prefs)
    }

    /// Whether an app PIN has been configured.
    pub fn is_pin_set(&self) -> bool {
        self.state.borrow().pin.is_some()
    }

    /// Overwrites the app PIN. No confirmation-match is required at this
    /// layer; the calling surface decides whether to ask twice.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the record fails.
    pub fn set_pin(&self, pin: &str) -> AppResult<()> {
        let mut prefs = self.current();
        prefs.pin = Some(pin.to_string());
        self.persist(prefs)
    }

    /// Exact string compare against the stored PIN.
    ///
    /// Returns `false` when no PIN is configured. A mismatch never clears or
    /// alters the stored PIN; there is no lockout or attempt counting.
    pub fn validate_pin(&self, pin: &str) -> bool {
        match &self.state.borrow().pin {
            Some(stored) => stored == pin,
            None => {
                warn!("PIN validation attempted with no PIN configured");
                false
            }
        }
    }

    fn persist(&self, prefs: UserPreferences) -> AppResult<()> {
        let encoded =
            serde_json::to_vec_pretty(&prefs).map_err(PreferencesError::Encode)?;

        let dir = self.path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| PreferencesError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        tmp.write_all(&encoded).map_err(|e| PreferencesError::Write {
            path: self.path.clone(),
            source: e,
        })?;
        tmp.persist(&self.path)
            .map_err(|e| PreferencesError::Write {
                path: self.path.clone(),
                source: e.error,
            })?;

        debug!("Preferences written to {:?}", self.path);
        self.state.send_replace(prefs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::open(dir.path().join("preferences.json")).unwrap()
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let prefs = store.current();
        assert_eq!(prefs.user_name, "Friend");
        assert_eq!(prefs.accent_color, "#5D1424");
        assert!(prefs.pin.is_none());
    }

    #[test]
    fn test_save_user_name_trims() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save_user_name("  Asha  ").unwrap();
        assert_eq!(store.current().user_name, "Asha");
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");

        let store = PreferenceStore::open(path.clone()).unwrap();
        store.save_user_name("Asha").unwrap();
        store.save_accent_color("#112233").unwrap();
        drop(store);

        let reopened = PreferenceStore::open(path).unwrap();
        let prefs = reopened.current();
        assert_eq!(prefs.user_name, "Asha");
        assert_eq!(prefs.accent_color, "#112233");
    }

    #[test]
    fn test_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save_accent_color("#111111").unwrap();
        store.save_accent_color("#222222").unwrap();
        assert_eq!(store.current().accent_color, "#222222");
    }

    #[test]
    fn test_pin_set_and_validate() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(!store.is_pin_set());
        assert!(!store.validate_pin("1234"));

        store.set_pin("1234").unwrap();
        assert!(store.is_pin_set());
        assert!(store.validate_pin("1234"));

        // A wrong attempt neither clears nor alters the stored PIN
        assert!(!store.validate_pin("0000"));
        assert!(store.validate_pin("1234"));
    }

    #[test]
    fn test_pin_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set_pin("1234").unwrap();
        store.set_pin("9999").unwrap();
        assert!(!store.validate_pin("1234"));
        assert!(store.validate_pin("9999"));
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"user_name":"Asha"}"#).unwrap();

        let store = PreferenceStore::open(path).unwrap();
        let prefs = store.current();
        assert_eq!(prefs.user_name, "Asha");
        assert_eq!(prefs.accent_color, "#5D1424");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();

        assert!(PreferenceStore::open(path).is_err());
    }

    #[test]
    fn test_subscribe_observes_writes() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let rx = store.subscribe();

        store.save_user_name("Asha").unwrap();
        assert_eq!(rx.borrow().user_name, "Asha");
    }
}
