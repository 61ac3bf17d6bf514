use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::utils::time::current_timestamp;

/// Errors raised by credential store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store already holds a record with this username or email.
    #[error("username or email already exists")]
    DuplicateIdentity,

    #[error("failed to access credential store: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode credential store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A registered user. Only the digest of the graphical password is stored,
/// never the sequence itself.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserRecord {
    pub username: String,            // Original username as entered by user (for display)
    pub username_normalized: String, // Lowercase version for lookups and comparisons
    pub email: String,
    pub graphical_password_hash: String,
    pub created_at: u64,
}

impl UserRecord {
    pub fn new(username: &str, email: &str, graphical_password_hash: String) -> Self {
        let username = username.trim().to_string();
        Self {
            username_normalized: username.to_lowercase(),
            username,
            email: email.trim().to_string(),
            graphical_password_hash,
            created_at: current_timestamp(),
        }
    }
}

/// Normalize a username the way store keys are built.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Durable mapping from username to user record.
///
/// `insert` must enforce username and email uniqueness atomically and fail
/// with `StoreError::DuplicateIdentity` on violation; any existence pre-check
/// a caller performs is a best-effort early exit, not the source of truth.
pub trait CredentialStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    fn exists_by_username_or_email(&self, username: &str, email: &str)
        -> Result<bool, StoreError>;
    fn insert(&self, record: UserRecord) -> Result<(), StoreError>;
}

fn holds_identity(users: &HashMap<String, UserRecord>, username_normalized: &str, email: &str) -> bool {
    users.contains_key(username_normalized)
        || users.values().any(|u| u.email.eq_ignore_ascii_case(email))
}

/// In-memory credential store keyed by normalized username.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().expect("user map poisoned");
        Ok(users.get(&normalize_username(username)).cloned())
    }

    fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let users = self.users.lock().expect("user map poisoned");
        Ok(holds_identity(&users, &normalize_username(username), email.trim()))
    }

    fn insert(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().expect("user map poisoned");
        if holds_identity(&users, &record.username_normalized, &record.email) {
            return Err(StoreError::DuplicateIdentity);
        }
        users.insert(record.username_normalized.clone(), record);
        Ok(())
    }
}

/// Credential store persisted as a JSON file, loaded once at open and written
/// back after every insert.
pub struct FileCredentialStore {
    path: PathBuf,
    users: Mutex<HashMap<String, UserRecord>>,
}

impl FileCredentialStore {
    /// Open a store backed by the given file, starting empty if the file
    /// does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let users = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            users: Mutex::new(users),
        })
    }

    fn persist(&self, users: &HashMap<String, UserRecord>) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(users)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.lock().expect("user map poisoned");
        Ok(users.get(&normalize_username(username)).cloned())
    }

    fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, StoreError> {
        let users = self.users.lock().expect("user map poisoned");
        Ok(holds_identity(&users, &normalize_username(username), email.trim()))
    }

    fn insert(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().expect("user map poisoned");
        if holds_identity(&users, &record.username_normalized, &record.email) {
            return Err(StoreError::DuplicateIdentity);
        }
        let key = record.username_normalized.clone();
        users.insert(key.clone(), record);
        // Either the record exists fully, on disk and in memory, or not at all.
        if let Err(e) = self.persist(&users) {
            users.remove(&key);
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(username: &str, email: &str) -> UserRecord {
        UserRecord::new(username, email, "digest".to_string())
    }

    #[test]
    fn test_record_normalization() {
        let user = record("  TestUser ", "test@example.com");
        assert_eq!(user.username, "TestUser");
        assert_eq!(user.username_normalized, "testuser");
        assert!(user.created_at > 0);
    }

    #[test]
    fn test_memory_store_insert_and_find() {
        let store = MemoryCredentialStore::new();
        store.insert(record("TestUser", "test@example.com")).unwrap();

        // Lookups go through the normalized key.
        let found = store.find_by_username("testuser").unwrap().unwrap();
        assert_eq!(found.username, "TestUser");
        assert!(store.find_by_username("other").unwrap().is_none());
    }

    #[test]
    fn test_memory_store_rejects_duplicates() {
        let store = MemoryCredentialStore::new();
        store.insert(record("alice", "alice@example.com")).unwrap();

        // Same username, different email.
        assert!(matches!(
            store.insert(record("Alice", "second@example.com")),
            Err(StoreError::DuplicateIdentity)
        ));
        // Same email, different username.
        assert!(matches!(
            store.insert(record("bob", "ALICE@example.com")),
            Err(StoreError::DuplicateIdentity)
        ));

        assert!(store
            .exists_by_username_or_email("ALICE", "nobody@example.com")
            .unwrap());
        assert!(store
            .exists_by_username_or_email("nobody", "alice@example.com")
            .unwrap());
        assert!(!store
            .exists_by_username_or_email("nobody", "nobody@example.com")
            .unwrap());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        {
            let store = FileCredentialStore::open(&path).unwrap();
            store.insert(record("alice", "alice@example.com")).unwrap();
        }

        let reopened = FileCredentialStore::open(&path).unwrap();
        let found = reopened.find_by_username("alice").unwrap().unwrap();
        assert_eq!(found.email, "alice@example.com");
        assert!(matches!(
            reopened.insert(record("alice", "other@example.com")),
            Err(StoreError::DuplicateIdentity)
        ));
    }

    #[test]
    fn test_file_store_starts_empty_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::open(dir.path().join("missing.json")).unwrap();
        assert!(store.find_by_username("anyone").unwrap().is_none());
    }
}
