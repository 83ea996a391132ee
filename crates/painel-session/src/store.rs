//! Persisted auth record and its storage backends.
//!
//! The record is four string entries, under the same keys the browser
//! dashboard keeps in local storage: `token`, `username`, `role` and
//! `token_exp` (expiry as epoch milliseconds). Backends only ever replace
//! or remove the record as a whole, so a reader never sees a token from one
//! login next to a role from another.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use painel_protocol::{Codec, JsonCodec, Role};

use crate::StorageError;

// ---------------------------------------------------------------------------
// Keys and record
// ---------------------------------------------------------------------------

/// The four storage keys of an auth record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AuthKey {
    Token,
    Username,
    Role,
    Expiry,
}

impl AuthKey {
    pub const ALL: [AuthKey; 4] = [Self::Token, Self::Username, Self::Role, Self::Expiry];

    /// The key name used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Username => "username",
            Self::Role => "role",
            Self::Expiry => "token_exp",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

/// A complete persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    pub token: String,
    pub username: String,
    pub role: Role,
    /// `None` when the stored expiry is missing or unreadable; the guard
    /// treats that the same as an expired session.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthRecord {
    fn to_entries(&self) -> BTreeMap<AuthKey, String> {
        let mut entries = BTreeMap::new();
        entries.insert(AuthKey::Token, self.token.clone());
        entries.insert(AuthKey::Username, self.username.clone());
        entries.insert(AuthKey::Role, self.role.as_str().to_string());
        if let Some(exp) = self.expires_at {
            entries.insert(AuthKey::Expiry, exp.timestamp_millis().to_string());
        }
        entries
    }

    /// Builds a record from raw entries. No (or an empty) token means no
    /// record at all.
    fn from_entries(mut entries: BTreeMap<AuthKey, String>) -> Option<Self> {
        let token = entries.remove(&AuthKey::Token).filter(|t| !t.is_empty())?;
        Some(Self {
            token,
            username: entries.remove(&AuthKey::Username).unwrap_or_default(),
            role: entries
                .get(&AuthKey::Role)
                .map(|r| Role::parse_lossy(r))
                .unwrap_or_default(),
            expires_at: entries
                .get(&AuthKey::Expiry)
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .and_then(DateTime::from_timestamp_millis),
        })
    }
}

// ---------------------------------------------------------------------------
// AuthStore
// ---------------------------------------------------------------------------

/// Key/value storage for the auth record.
///
/// Implementations provide three whole-record operations; the per-key and
/// typed accessors are derived from them.
pub trait AuthStore: Send + Sync + 'static {
    /// All entries currently stored. Empty when logged out.
    fn snapshot(&self) -> Result<BTreeMap<AuthKey, String>, StorageError>;

    /// Replaces every entry at once.
    fn replace(&self, entries: BTreeMap<AuthKey, String>) -> Result<(), StorageError>;

    /// Removes all four keys at once. Succeeds if nothing was stored.
    fn clear_auth(&self) -> Result<(), StorageError>;

    /// Reads a single entry.
    fn get(&self, key: AuthKey) -> Result<Option<String>, StorageError> {
        Ok(self.snapshot()?.remove(&key))
    }

    /// Reads the full record, or `None` if there is no token.
    fn load(&self) -> Result<Option<AuthRecord>, StorageError> {
        Ok(AuthRecord::from_entries(self.snapshot()?))
    }

    /// Persists a full record.
    fn save(&self, record: &AuthRecord) -> Result<(), StorageError> {
        self.replace(record.to_entries())
    }
}

impl<T: AuthStore> AuthStore for std::sync::Arc<T> {
    fn snapshot(&self) -> Result<BTreeMap<AuthKey, String>, StorageError> {
        (**self).snapshot()
    }

    fn replace(&self, entries: BTreeMap<AuthKey, String>) -> Result<(), StorageError> {
        (**self).replace(entries)
    }

    fn clear_auth(&self) -> Result<(), StorageError> {
        (**self).clear_auth()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// MemoryAuthStore
// ---------------------------------------------------------------------------

/// In-process store. Nothing survives a restart; used in tests and by
/// hosts that keep the session elsewhere.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    entries: Mutex<BTreeMap<AuthKey, String>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single raw entry, bypassing record validation.
    ///
    /// Lets callers (and tests) reproduce storage written by older clients,
    /// such as a token saved without an expiry.
    pub fn set_raw(&self, key: AuthKey, value: impl Into<String>) {
        lock(&self.entries).insert(key, value.into());
    }
}

impl AuthStore for MemoryAuthStore {
    fn snapshot(&self) -> Result<BTreeMap<AuthKey, String>, StorageError> {
        Ok(lock(&self.entries).clone())
    }

    fn replace(&self, entries: BTreeMap<AuthKey, String>) -> Result<(), StorageError> {
        *lock(&self.entries) = entries;
        Ok(())
    }

    fn clear_auth(&self) -> Result<(), StorageError> {
        lock(&self.entries).clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileAuthStore
// ---------------------------------------------------------------------------

/// JSON file store.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the real
/// one, and clearing removes the file, so both are atomic on the same
/// filesystem.
#[derive(Debug)]
pub struct FileAuthStore {
    path: PathBuf,
    codec: JsonCodec,
    /// Serializes read-modify-write within this process.
    io: Mutex<()>,
}

impl FileAuthStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            codec: JsonCodec,
            io: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl AuthStore for FileAuthStore {
    fn snapshot(&self) -> Result<BTreeMap<AuthKey, String>, StorageError> {
        let _io = lock(&self.io);
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        let raw: BTreeMap<String, String> = self.codec.decode(&bytes)?;
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| AuthKey::parse(&k).map(|key| (key, v)))
            .collect())
    }

    fn replace(&self, entries: BTreeMap<AuthKey, String>) -> Result<(), StorageError> {
        let _io = lock(&self.io);
        let raw: BTreeMap<&str, String> = entries
            .into_iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        let bytes = self.codec.encode(&raw)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear_auth(&self) -> Result<(), StorageError> {
        let _io = lock(&self.io);
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AuthRecord {
        AuthRecord {
            token: "tok-1".into(),
            username: "hiury".into(),
            role: Role::Admin,
            expires_at: DateTime::from_timestamp_millis(1_900_000_000_000),
        }
    }

    // =====================================================================
    // AuthRecord
    // =====================================================================

    #[test]
    fn test_from_entries_without_token_is_none() {
        let mut entries = BTreeMap::new();
        entries.insert(AuthKey::Username, "hiury".to_string());

        assert_eq!(AuthRecord::from_entries(entries), None);
    }

    #[test]
    fn test_from_entries_unparseable_expiry_is_none() {
        let mut entries = record().to_entries();
        entries.insert(AuthKey::Expiry, "NaN".to_string());

        let parsed = AuthRecord::from_entries(entries).unwrap();

        assert_eq!(parsed.expires_at, None);
        assert_eq!(parsed.token, "tok-1");
    }

    #[test]
    fn test_from_entries_missing_role_defaults_to_comum() {
        let mut entries = record().to_entries();
        entries.remove(&AuthKey::Role);

        assert_eq!(AuthRecord::from_entries(entries).unwrap().role, Role::Comum);
    }

    #[test]
    fn test_auth_key_names_match_storage_layout() {
        let names: Vec<_> = AuthKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, ["token", "username", "role", "token_exp"]);
    }

    // =====================================================================
    // MemoryAuthStore
    // =====================================================================

    #[test]
    fn test_memory_store_save_then_load() {
        let store = MemoryAuthStore::new();
        store.save(&record()).unwrap();

        assert_eq!(store.load().unwrap(), Some(record()));
        assert_eq!(store.get(AuthKey::Role).unwrap().as_deref(), Some("admin"));
    }

    #[test]
    fn test_memory_store_clear_removes_all_keys() {
        let store = MemoryAuthStore::new();
        store.save(&record()).unwrap();

        store.clear_auth().unwrap();

        assert!(store.snapshot().unwrap().is_empty());
        assert_eq!(store.load().unwrap(), None);
    }

    // =====================================================================
    // FileAuthStore
    // =====================================================================

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAuthStore::new(dir.path().join("auth.json"));

        assert_eq!(store.load().unwrap(), None);
        store.clear_auth().expect("clearing nothing should succeed");
    }

    #[test]
    fn test_file_store_save_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auth.json");
        FileAuthStore::new(&path).save(&record()).unwrap();

        let reopened = FileAuthStore::new(&path);

        assert_eq!(reopened.load().unwrap(), Some(record()));
        assert!(!dir.path().join("nested").join("auth.json.tmp").exists());
    }

    #[test]
    fn test_file_store_uses_browser_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        FileAuthStore::new(&path).save(&record()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();

        assert!(text.contains("\"token_exp\":\"1900000000000\""), "{text}");
        assert!(text.contains("\"role\":\"admin\""), "{text}");
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let store = FileAuthStore::new(&path);
        store.save(&record()).unwrap();

        store.clear_auth().unwrap();

        assert!(!path.exists());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileAuthStore::new(&path).load();

        assert!(matches!(result, Err(StorageError::Corrupt(_))));
    }
}
