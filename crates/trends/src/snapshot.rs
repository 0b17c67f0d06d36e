//! Durable baseline of the last observed capacity per directory.
//!
//! The snapshot is a JSON object mapping each directory path to its last
//! observed data and metadata usage in GB:
//!
//! ```json
//! {
//!     "/data/a": {
//!         "data": 12.0,
//!         "metadata": 1.5
//!     }
//! }
//! ```
//!
//! It is the only state carried between runs.

use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Last known usage of one directory, in GB rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub data: f64,
    pub metadata: f64,
}

impl SnapshotEntry {
    #[must_use]
    pub fn new(data: f64, metadata: f64) -> Self {
        Self { data, metadata }
    }
}

/// Path -> [`SnapshotEntry`], at most one entry per path.
///
/// Entries are never removed; directories that disappear keep their last
/// observed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<String, SnapshotEntry>,
}

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&SnapshotEntry> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut SnapshotEntry> {
        self.entries.get_mut(path)
    }

    /// Insert or overwrite the entry for `path`, returning the old one.
    pub fn insert(&mut self, path: impl Into<String>, entry: SnapshotEntry) -> Option<SnapshotEntry> {
        self.entries.insert(path.into(), entry)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SnapshotEntry)> {
        self.entries.iter()
    }
}

/// Loads and atomically saves a [`Snapshot`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot.
    ///
    /// Returns [`SnapshotError::Missing`] if no snapshot has been saved yet.
    pub fn load(&self) -> Result<Snapshot> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SnapshotError::Missing(self.path.clone()));
            }
            Err(e) => return Err(SnapshotError::io(&self.path, e)),
        };

        let snapshot: Snapshot =
            serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
                path: self.path.clone(),
                source,
            })?;

        log::debug!(
            "Loaded {} snapshot entries from {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(snapshot)
    }

    /// Load the snapshot, treating a missing file as a cold start.
    pub fn load_or_default(&self) -> Result<Snapshot> {
        match self.load() {
            Err(SnapshotError::Missing(path)) => {
                log::info!(
                    "No snapshot at {}, every directory will be reported as new",
                    path.display()
                );
                Ok(Snapshot::new())
            }
            other => other,
        }
    }

    /// Save atomically: serialize -> temp file -> fsync -> rename.
    ///
    /// A crash at any point leaves either the previous snapshot or the new
    /// one in place, never a partial file.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SnapshotError::io(parent, e))?;
        }

        let content = to_indented_json(snapshot).map_err(|source| SnapshotError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.tmp_path();
        let written = write_synced(&tmp_path, &content).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(SnapshotError::io(&self.path, e));
        }

        log::debug!(
            "Saved {} snapshot entries to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Sibling temp file, so the final rename stays on one filesystem.
    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn to_indented_json(snapshot: &Snapshot) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    snapshot.serialize(&mut ser)?;
    Ok(buf)
}

fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert("/data/a", SnapshotEntry::new(10.0, 1.0));
        snapshot.insert("/data/b", SnapshotEntry::new(5.0, 0.2));
        snapshot
    }

    #[test]
    fn test_load_missing_is_distinct() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("previous_dir_usages.json"));

        let err = store.load().unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn test_load_or_default_cold_start() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("previous_dir_usages.json"));

        let snapshot = store.load_or_default().unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("config").join("usages.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, sample());
        assert_eq!(loaded.get("/data/b"), Some(&SnapshotEntry::new(5.0, 0.2)));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("usages.json"));

        store.save(&sample()).unwrap();
        store.save(&Snapshot::new()).unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("usages.json")]);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_saved_format() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("usages.json"));

        let mut snapshot = Snapshot::new();
        snapshot.insert("/data/a", SnapshotEntry::new(12.0, 1.5));
        store.save(&snapshot).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content,
            "{\n    \"/data/a\": {\n        \"data\": 12.0,\n        \"metadata\": 1.5\n    }\n}"
        );
    }

    #[test]
    fn test_load_reads_integer_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("usages.json");
        fs::write(&path, r#"{"/data/a": {"data": 10, "metadata": 1}}"#).unwrap();

        let snapshot = SnapshotStore::new(&path).load().unwrap();
        assert_eq!(snapshot.get("/data/a"), Some(&SnapshotEntry::new(10.0, 1.0)));
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("usages.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SnapshotStore::new(&path);
        assert!(matches!(store.load(), Err(SnapshotError::Parse { .. })));
        assert!(store.load_or_default().is_err());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut snapshot = sample();
        let old = snapshot.insert("/data/a", SnapshotEntry::new(11.0, 1.0));
        assert_eq!(old, Some(SnapshotEntry::new(10.0, 1.0)));
        assert_eq!(snapshot.len(), 2);
    }
}
