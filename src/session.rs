//! Session store: user accounts, the logged-in marker, and per-user history.
//!
//! Persistence is injected through [`StorageBackend`], a key-value store with
//! two lifetimes: a durable namespace (accounts, history) and a
//! session-scoped namespace (the current-user marker). The CLI uses
//! [`FileBackend`]; tests use [`MemoryBackend`]. All reads degrade to empty
//! or none on missing or corrupt data.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::BlendError;

/// Maximum number of history records kept per user, newest first.
pub const HISTORY_LIMIT: usize = 20;

const USERS_KEY: &str = "photoblendUsers";
const SESSION_KEY: &str = "photoblendSession";
const HISTORY_KEY_PREFIX: &str = "photoblendHistory_";

fn history_key(username: &str) -> String {
    format!("{HISTORY_KEY_PREFIX}{username}")
}

// Disambiguates record ids allocated within the same millisecond.
static ID_DISCRIMINANT: AtomicU64 = AtomicU64::new(0);

/// A registered account. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique username (case-insensitive key).
    pub username: String,
    /// Password as provided at registration.
    pub password: String,
}

/// A persisted snapshot of one completed generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Time-derived unique token.
    pub id: String,
    /// Inline representation of the group photo input.
    pub group_image: String,
    /// Inline representation of the person photo input.
    pub person_image: String,
    /// Requested resolution tier.
    pub resolution: String,
    /// Requested aspect-ratio preference.
    pub aspect_ratio: String,
    /// Base64-encoded output image bytes.
    pub generated_image: String,
    /// MIME type of the output image.
    pub generated_mime: String,
}

impl HistoryRecord {
    /// Allocate a new record with a time-derived id.
    #[must_use]
    pub fn new(
        group_image: String,
        person_image: String,
        resolution: String,
        aspect_ratio: String,
        generated_image: String,
        generated_mime: String,
    ) -> Self {
        let seq = ID_DISCRIMINANT.fetch_add(1, Ordering::Relaxed);
        let id = format!("{:x}{seq:02x}", chrono::Utc::now().timestamp_millis());
        Self { id, group_image, person_image, resolution, aspect_ratio, generated_image, generated_mime }
    }
}

/// Key-value persistence with durable and session-scoped namespaces.
pub trait StorageBackend {
    /// Read a durable value, or `None` if absent or unreadable.
    fn read_durable(&self, key: &str) -> Option<String>;
    /// Write a durable value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn write_durable(&mut self, key: &str, value: &str) -> std::io::Result<()>;
    /// Read a session-scoped value, or `None` if absent or unreadable.
    fn read_session(&self, key: &str) -> Option<String>;
    /// Write a session-scoped value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn write_session(&mut self, key: &str, value: &str) -> std::io::Result<()>;
    /// Remove a session-scoped value.
    fn clear_session(&mut self, key: &str);
}

/// In-memory backend for tests and embedding hosts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    durable: HashMap<String, String>,
    session: HashMap<String, String>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read_durable(&self, key: &str) -> Option<String> {
        self.durable.get(key).cloned()
    }

    fn write_durable(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        self.durable.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read_session(&self, key: &str) -> Option<String> {
        self.session.get(key).cloned()
    }

    fn write_session(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        self.session.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear_session(&mut self, key: &str) {
        self.session.remove(key);
    }
}

/// File backend: two JSON maps (`durable.json`, `session.json`) under a
/// state directory.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at the given state directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_map(&self, file: &str) -> HashMap<String, String> {
        let path = self.dir.join(file);
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    fn write_map(&self, file: &str, map: &HashMap<String, String>) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let contents = serde_json::to_string(map).map_err(std::io::Error::other)?;
        std::fs::write(self.dir.join(file), contents)
    }
}

impl StorageBackend for FileBackend {
    fn read_durable(&self, key: &str) -> Option<String> {
        self.read_map("durable.json").remove(key)
    }

    fn write_durable(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        let mut map = self.read_map("durable.json");
        map.insert(key.to_string(), value.to_string());
        self.write_map("durable.json", &map)
    }

    fn read_session(&self, key: &str) -> Option<String> {
        self.read_map("session.json").remove(key)
    }

    fn write_session(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        let mut map = self.read_map("session.json");
        map.insert(key.to_string(), value.to_string());
        self.write_map("session.json", &map)
    }

    fn clear_session(&mut self, key: &str) {
        let mut map = self.read_map("session.json");
        if map.remove(key).is_some() {
            let _ = self.write_map("session.json", &map);
        }
    }
}

/// User accounts, login session, and per-user history over an injected
/// backend.
pub struct SessionStore {
    backend: Box<dyn StorageBackend>,
}

impl SessionStore {
    /// Create a store over the given backend.
    #[must_use]
    pub fn new(backend: Box<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    fn users(&self) -> Vec<UserAccount> {
        self.backend
            .read_durable(USERS_KEY)
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    fn save_users(&mut self, users: &[UserAccount]) -> Result<(), BlendError> {
        let json = serde_json::to_string(users).map_err(|e| BlendError::Config(e.to_string()))?;
        self.backend.write_durable(USERS_KEY, &json).map_err(BlendError::Io)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::InvalidArgument`] for an empty username or
    /// password, [`BlendError::UsernameTaken`] for a case-insensitive
    /// duplicate, and [`BlendError::WeakPassword`] for a password shorter
    /// than 4 characters.
    pub fn register(&mut self, username: &str, password: &str) -> Result<UserAccount, BlendError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(BlendError::InvalidArgument(
                "username and password must not be empty".into(),
            ));
        }
        let mut users = self.users();
        if users.iter().any(|u| u.username.eq_ignore_ascii_case(username)) {
            return Err(BlendError::UsernameTaken);
        }
        if password.chars().count() < 4 {
            return Err(BlendError::WeakPassword);
        }
        let account = UserAccount { username: username.to_string(), password: password.to_string() };
        users.push(account.clone());
        self.save_users(&users)?;
        Ok(account)
    }

    /// Log in and set the session-scoped current-user marker.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::InvalidCredentials`] if no case-insensitive
    /// username match exists or the password differs.
    pub fn login(&mut self, username: &str, password: &str) -> Result<UserAccount, BlendError> {
        let account = self
            .users()
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .filter(|u| u.password == password)
            .ok_or(BlendError::InvalidCredentials)?;
        let json =
            serde_json::to_string(&account).map_err(|e| BlendError::Config(e.to_string()))?;
        self.backend.write_session(SESSION_KEY, &json).map_err(BlendError::Io)?;
        Ok(account)
    }

    /// Clear the session-scoped current-user marker.
    pub fn logout(&mut self) {
        self.backend.clear_session(SESSION_KEY);
    }

    /// The logged-in account, or `None`. Corrupt or missing storage degrades
    /// to `None`.
    #[must_use]
    pub fn current_user(&self) -> Option<UserAccount> {
        self.backend
            .read_session(SESSION_KEY)
            .and_then(|json| serde_json::from_str(&json).ok())
    }

    /// The user's history, newest first. Read failures degrade to an empty
    /// list.
    #[must_use]
    pub fn history(&self, username: &str) -> Vec<HistoryRecord> {
        self.backend
            .read_durable(&history_key(username))
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    /// Replace the user's history.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be persisted. Callers treat
    /// history as best-effort and only warn on failure.
    pub fn save_history(
        &mut self,
        username: &str,
        records: &[HistoryRecord],
    ) -> Result<(), BlendError> {
        let json = serde_json::to_string(records).map_err(|e| BlendError::Config(e.to_string()))?;
        self.backend.write_durable(&history_key(username), &json).map_err(BlendError::Io)
    }

    /// Prepend a record, dropping the oldest beyond [`HISTORY_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns an error if the updated history cannot be persisted.
    pub fn push_history(
        &mut self,
        username: &str,
        record: HistoryRecord,
    ) -> Result<(), BlendError> {
        let mut records = self.history(username);
        records.insert(0, record);
        records.truncate(HISTORY_LIMIT);
        self.save_history(username, &records)
    }

    /// Remove all of the user's history.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleared history cannot be persisted.
    pub fn clear_history(&mut self, username: &str) -> Result<(), BlendError> {
        self.save_history(username, &[])
    }
}
