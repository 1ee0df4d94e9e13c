//! Roster persistence: the whole roster is one JSON blob under a single key.

use crate::models::Player;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Errors from loading or saving the roster.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Roster file error: {0}")]
    Io(#[from] io::Error),

    #[error("Roster encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Roster store lock poisoned")]
    Poisoned,
}

/// Durable roster storage. Every save replaces the previous content completely.
pub trait RosterStore: Send + Sync {
    /// Stored roster, or empty if nothing has been saved yet.
    fn load(&self) -> Result<Vec<Player>, StoreError>;

    fn save(&self, players: &[Player]) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// Roster kept in a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Player>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&self, players: &[Player]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(players)?;
        // Readers never see a partially written file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved {} players to {}", players.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Same JSON blob, held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryStore {
    fn load(&self) -> Result<Vec<Player>, StoreError> {
        let blob = self.blob.lock().map_err(|_| StoreError::Poisoned)?;
        match blob.as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, players: &[Player]) -> Result<(), StoreError> {
        let json = serde_json::to_string(players)?;
        *self.blob.lock().map_err(|_| StoreError::Poisoned)? = Some(json);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.blob.lock().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("roster-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn memory_store_round_trips_and_clears() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_empty());
        let players = vec![Player::new("Ada"), Player::with_elo("Bo", 1016)];
        store.save(&players).unwrap();
        assert_eq!(store.load().unwrap(), players);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn file_store_missing_file_loads_empty() {
        let store = JsonFileStore::new(temp_path());
        assert!(store.load().unwrap().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn file_store_save_replaces_content() {
        let store = JsonFileStore::new(temp_path());
        store.save(&[Player::new("Old")]).unwrap();
        let players = vec![Player::with_elo("New", 984)];
        store.save(&players).unwrap();
        assert_eq!(store.load().unwrap(), players);
        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_reads_persisted_format() {
        let path = temp_path();
        fs::write(
            &path,
            r#"[{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","name":"Ada","currentElo":1032}]"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);
        let players = store.load().unwrap();
        assert_eq!(players[0].name, "Ada");
        assert_eq!(players[0].current_elo, 1032);
        store.clear().unwrap();
    }

    #[test]
    fn file_store_rejects_garbage() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json(_))));
        store.clear().unwrap();
    }
}
