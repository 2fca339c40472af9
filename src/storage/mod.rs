//! Durable set of listing ids that were already recorded
//!
//! The store is a JSON array of ids on disk. It is read once at startup and
//! rewritten after every new id, keeping only the most recently inserted
//! `capacity` ids. The in-memory set is never trimmed, so an id recorded
//! during this run is never reported as unseen again, even if the file write
//! failed or the id was evicted from the file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::StoreError;

pub const DEFAULT_CAPACITY: usize = 1000;

pub struct SeenStore {
    path: PathBuf,
    capacity: usize,
    ids: HashSet<String>,
    /// Insertion order, oldest first
    order: Vec<String>,
}

impl SeenStore {
    /// Load the store, starting empty if the file is missing or unreadable.
    /// A missing file is created as an empty array.
    pub fn load(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let mut store = Self {
            path,
            capacity,
            ids: HashSet::new(),
            order: Vec::new(),
        };

        if !store.path.exists() {
            info!("Creating seen store at {}", store.path.display());
            if let Err(e) = store.persist() {
                warn!("Failed to create seen store: {}", e);
            }
            return store;
        }

        match read_ids(&store.path) {
            Ok(ids) => {
                for id in ids {
                    store.insert(id);
                }
                info!("Loaded {} items from history.", store.len());
            }
            Err(e) => {
                warn!(
                    "Could not load seen store {}, starting empty: {}",
                    store.path.display(),
                    e
                );
            }
        }

        store
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert `id` and persist. Returns `false` when it was already present,
    /// in which case nothing is written.
    pub fn record(&mut self, id: &str) -> bool {
        if !self.insert(id.to_string()) {
            return false;
        }

        if let Err(e) = self.persist() {
            warn!("Save seen store failed: {}", e);
        }
        true
    }

    /// Write the most recently inserted `capacity` ids.
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self.retained())?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn insert(&mut self, id: String) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.insert(id.clone());
        self.order.push(id);
        true
    }

    fn retained(&self) -> &[String] {
        let start = self.order.len().saturating_sub(self.capacity);
        &self.order[start..]
    }
}

fn read_ids(path: &Path) -> Result<Vec<String>, StoreError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stored_ids(path: &Path) -> Vec<String> {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn missing_file_is_created_as_empty_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_items.json");

        let store = SeenStore::load(&path, DEFAULT_CAPACITY);

        assert!(store.is_empty());
        assert!(stored_ids(&path).is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_items.json");
        fs::write(&path, "{not json").unwrap();

        let store = SeenStore::load(&path, DEFAULT_CAPACITY);

        assert!(store.is_empty());
    }

    #[test]
    fn record_persists_and_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_items.json");

        let mut store = SeenStore::load(&path, DEFAULT_CAPACITY);
        assert!(store.record("111"));
        assert!(store.record("222"));
        assert!(!store.record("111"));

        assert_eq!(stored_ids(&path), ["111", "222"]);

        let reloaded = SeenStore::load(&path, DEFAULT_CAPACITY);
        assert!(reloaded.has("111"));
        assert!(reloaded.has("222"));
        assert!(!reloaded.has("333"));
    }

    #[test]
    fn file_keeps_only_most_recent_ids_but_memory_keeps_all() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_items.json");

        let mut store = SeenStore::load(&path, 3);
        for id in ["1", "2", "3", "4", "5"] {
            store.record(id);
        }

        assert_eq!(stored_ids(&path), ["3", "4", "5"]);
        assert!(store.has("1"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn never_persists_more_than_default_capacity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_items.json");

        let mut store = SeenStore::load(&path, DEFAULT_CAPACITY);
        for n in 0..1_050 {
            store.record(&n.to_string());
        }

        let ids = stored_ids(&path);
        assert_eq!(ids.len(), DEFAULT_CAPACITY);
        assert_eq!(ids.first().map(String::as_str), Some("50"));
        assert_eq!(ids.last().map(String::as_str), Some("1049"));
    }

    #[test]
    fn failed_write_keeps_in_memory_membership() {
        let dir = tempdir().unwrap();
        // A directory in place of the file makes every write fail.
        let path = dir.path().join("blocked");
        fs::create_dir(&path).unwrap();

        let mut store = SeenStore::load(&path, DEFAULT_CAPACITY);
        assert!(store.record("9001"));
        assert!(store.has("9001"));
        assert!(!store.record("9001"));
    }
}
