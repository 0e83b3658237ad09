//! Per-user file store.
//!
//! Profiles and interaction logs are stored as individual JSON files keyed by
//! user id, written atomically (temp file + rename) so a crash never leaves a
//! half-written record:
//!
//! ```text
//! base_path/
//! └── users/
//!     ├── 12345.profile.json
//!     └── 12345.interactions.json
//! ```
//!
//! This is the full extent of StudyBot's durability story: simple
//! key-value-per-user files, no database, no cross-file transactions.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::models::{Interaction, UserProfile};

/// Maximum interactions retained per user (oldest dropped first).
const MAX_INTERACTIONS: usize = 100;

/// Writes data to a file atomically.
///
/// Writes to a temporary file in the same directory first, then renames it
/// over the target path, so the file is never observed partially written.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| CoreError::DirectoryError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    // Temp file in the same directory (for same-filesystem rename)
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut temp_file =
        tempfile::NamedTempFile::new_in(dir).map_err(|source| CoreError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file
        .write_all(data)
        .map_err(|source| CoreError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file
        .flush()
        .map_err(|source| CoreError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;

    temp_file.persist(path).map_err(|e| CoreError::WriteError {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}

/// Writes JSON data to a file atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Reads and deserializes JSON from a file, returning None if it doesn't exist.
pub fn read_json_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).map_err(|source| CoreError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(serde_json::from_str(&data)?))
}

/// Manages per-user profile and interaction persistence.
pub struct UserStore {
    base_path: PathBuf,
}

impl UserStore {
    /// Creates a new UserStore rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn users_dir(&self) -> PathBuf {
        self.base_path.join("users")
    }

    fn profile_path(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{}.profile.json", user_id))
    }

    fn interactions_path(&self, user_id: &str) -> PathBuf {
        self.users_dir()
            .join(format!("{}.interactions.json", user_id))
    }

    /// Saves a user profile.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        atomic_write_json(&self.profile_path(&profile.user_id), profile)
    }

    /// Loads a user profile, if one exists.
    pub fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        read_json_optional(&self.profile_path(user_id))
    }

    /// Appends an interaction to the user's log, keeping the most recent
    /// `MAX_INTERACTIONS` entries.
    pub fn record_interaction(&self, interaction: &Interaction) -> Result<()> {
        let path = self.interactions_path(&interaction.user_id);
        let mut interactions: Vec<Interaction> =
            read_json_optional(&path)?.unwrap_or_default();

        interactions.push(interaction.clone());
        if interactions.len() > MAX_INTERACTIONS {
            let excess = interactions.len() - MAX_INTERACTIONS;
            interactions.drain(..excess);
        }

        atomic_write_json(&path, &interactions)
    }

    /// Loads a user's recorded interactions (empty if none).
    pub fn load_interactions(&self, user_id: &str) -> Result<Vec<Interaction>> {
        Ok(read_json_optional(&self.interactions_path(user_id))?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");

        atomic_write(&path, b"hello world").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/test.txt");

        atomic_write(&path, b"nested content").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_profile_roundtrip() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());

        let profile = UserProfile::new("12345", "Ada").with_username("ada_l");
        store.save_profile(&profile).unwrap();

        let loaded = store.load_profile("12345").unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_load_missing_profile() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());
        assert!(store.load_profile("nobody").unwrap().is_none());
    }

    #[test]
    fn test_record_and_load_interactions() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());

        store
            .record_interaction(&Interaction::new("1", "hello", "greeting"))
            .unwrap();
        store
            .record_interaction(&Interaction::new("1", "bye", "farewell"))
            .unwrap();

        let loaded = store.load_interactions("1").unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].intent, "greeting");
        assert_eq!(loaded[1].intent, "farewell");
    }

    #[test]
    fn test_interactions_capped() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path());

        for i in 0..(MAX_INTERACTIONS + 5) {
            store
                .record_interaction(&Interaction::new("1", format!("msg {}", i), "unknown"))
                .unwrap();
        }

        let loaded = store.load_interactions("1").unwrap();
        assert_eq!(loaded.len(), MAX_INTERACTIONS);
        // Oldest entries were dropped first.
        assert_eq!(loaded[0].message, "msg 5");
    }
}
