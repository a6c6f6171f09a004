use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knowledge::KnowledgeNode;

pub const PROGRESS_KEY: &str = "devverse_progress";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("store contents are malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// String key-value persistence, one value per namespace key.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_owned(), value.to_owned());
        Self { values }
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// A JSON object of string values on disk, rewritten whole on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // A corrupt file is replaced rather than blocking every later write.
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(StoreError::Malformed(error)) => {
                tracing::warn!(%error, path = %self.path.display(), "replacing malformed store file");
                BTreeMap::new()
            }
            Err(error) => return Err(error),
        };
        values.insert(key.to_owned(), value.to_owned());

        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let raw = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, raw).map_err(io_error)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    pub progress: f32,
    pub completed: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressUpdate {
    pub progress: Option<f32>,
    pub completed: Option<bool>,
}

impl ProgressUpdate {
    pub fn progress(progress: f32) -> Self {
        Self {
            progress: Some(progress),
            completed: None,
        }
    }

    pub fn mastered() -> Self {
        Self {
            progress: Some(100.0),
            completed: Some(true),
        }
    }
}

pub struct ProgressStore {
    backend: Box<dyn KeyValueStore>,
    entries: HashMap<String, ProgressData>,
    revision: u64,
}

impl ProgressStore {
    /// Reads the persisted map once; unreadable or corrupt data starts empty.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let entries = match backend.get(PROGRESS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<HashMap<String, ProgressData>>(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(%error, "discarding malformed progress data");
                    HashMap::new()
                }
            },
            Ok(None) => HashMap::new(),
            Err(error) => {
                tracing::warn!(%error, "progress store unreadable; starting empty");
                HashMap::new()
            }
        };

        tracing::debug!(entries = entries.len(), "progress loaded");
        Self {
            backend,
            entries,
            revision: 0,
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::default()))
    }

    /// Bumped on every write; projections cache against it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<ProgressData> {
        self.entries.get(id).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.entries.get(id).is_some_and(|data| data.completed)
    }

    /// Stored progress for the node, or the node's own seed values.
    pub fn progress_for(&self, node: &KnowledgeNode) -> ProgressData {
        self.get(&node.id).unwrap_or(ProgressData {
            progress: node.progress.unwrap_or(0.0),
            completed: node.completed.unwrap_or(false),
        })
    }

    pub fn is_locked(&self, prerequisites: &[String]) -> bool {
        prerequisites.iter().any(|id| !self.is_completed(id))
    }

    pub fn update_progress(&mut self, id: &str, update: ProgressUpdate) -> ProgressData {
        let mut data = self.entries.get(id).copied().unwrap_or_default();
        if let Some(progress) = update.progress {
            data.progress = progress;
        }
        if let Some(completed) = update.completed {
            data.completed = completed;
        }

        data.progress = if data.progress.is_finite() {
            data.progress.clamp(0.0, 100.0)
        } else {
            0.0
        };
        if data.progress >= 100.0 {
            data.completed = true;
        }

        self.entries.insert(id.to_owned(), data);
        self.revision = self.revision.wrapping_add(1);
        tracing::debug!(id, progress = data.progress, completed = data.completed, "progress updated");
        self.persist();
        data
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::error!(%error, "failed to serialize progress");
                return;
            }
        };

        if let Err(error) = self.backend.set(PROGRESS_KEY, &raw) {
            tracing::error!(%error, "failed to persist progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_progress_auto_completes() {
        let mut store = ProgressStore::in_memory();
        let data = store.update_progress("n1", ProgressUpdate::progress(100.0));
        assert_eq!(
            data,
            ProgressData {
                progress: 100.0,
                completed: true
            }
        );
        assert!(store.is_completed("n1"));
    }

    #[test]
    fn progress_is_clamped() {
        let mut store = ProgressStore::in_memory();
        assert_eq!(store.update_progress("n1", ProgressUpdate::progress(150.0)).progress, 100.0);
        assert!(store.is_completed("n1"));
        assert_eq!(store.update_progress("n2", ProgressUpdate::progress(-5.0)).progress, 0.0);
        assert_eq!(store.update_progress("n3", ProgressUpdate::progress(f32::NAN)).progress, 0.0);
    }

    #[test]
    fn partial_updates_merge_with_existing_entry() {
        let mut store = ProgressStore::in_memory();
        store.update_progress("n1", ProgressUpdate::progress(40.0));
        let data = store.update_progress(
            "n1",
            ProgressUpdate {
                progress: None,
                completed: Some(true),
            },
        );
        assert_eq!(data.progress, 40.0);
        assert!(data.completed);
    }

    #[test]
    fn prerequisites_unlock_after_completion() {
        let mut store = ProgressStore::in_memory();
        let prerequisites = vec!["p1".to_string()];
        assert!(store.is_locked(&prerequisites));

        store.update_progress("p1", ProgressUpdate::progress(60.0));
        assert!(store.is_locked(&prerequisites));

        store.update_progress("p1", ProgressUpdate::mastered());
        assert!(!store.is_locked(&prerequisites));
        assert!(!store.is_locked(&[]));
    }

    #[test]
    fn corrupt_persisted_data_loads_empty() {
        let store = ProgressStore::load(Box::new(MemoryStore::with_value(
            PROGRESS_KEY,
            "definitely not json",
        )));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn writes_survive_reload_through_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("progress.json");

        let mut store = ProgressStore::load(Box::new(FileStore::new(&path)));
        store.update_progress("git-commit", ProgressUpdate::mastered());
        store.update_progress("trees", ProgressUpdate::progress(30.0));

        let reloaded = ProgressStore::load(Box::new(FileStore::new(&path)));
        assert!(reloaded.is_completed("git-commit"));
        assert_eq!(reloaded.get("trees").unwrap().progress, 30.0);
    }

    #[test]
    fn corrupt_store_file_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "{{{{").unwrap();

        let mut store = ProgressStore::load(Box::new(FileStore::new(&path)));
        assert_eq!(store.len(), 0);

        store.update_progress("n1", ProgressUpdate::progress(10.0));
        let reloaded = ProgressStore::load(Box::new(FileStore::new(&path)));
        assert_eq!(reloaded.get("n1").unwrap().progress, 10.0);
    }

    #[test]
    fn unreadable_store_file_is_left_untouched_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let bytes = [0xff, 0xfe, 0x00, 0x7b];
        fs::write(&path, bytes).unwrap();

        let mut store = FileStore::new(&path);
        let error = store.set(PROGRESS_KEY, "{}").unwrap_err();
        assert!(matches!(error, StoreError::Io { .. }));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn malformed_store_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "[not an object").unwrap();

        let mut store = FileStore::new(&path);
        store.set("theme", "night").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("night"));
    }

    #[test]
    fn seed_values_fill_in_for_missing_entries() {
        let node: KnowledgeNode = serde_json::from_str(
            r#"{"id":"seeded","label":"Seeded","type":"topic","progress":25,"completed":false}"#,
        )
        .unwrap();
        let mut store = ProgressStore::in_memory();
        assert_eq!(store.progress_for(&node).progress, 25.0);

        store.update_progress("seeded", ProgressUpdate::progress(80.0));
        assert_eq!(store.progress_for(&node).progress, 80.0);
    }
}
