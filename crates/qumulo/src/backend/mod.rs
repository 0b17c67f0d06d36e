//! The [`FileSystem`] trait and its implementations.
//!
//! [`rest::RestClient`] talks to a live cluster. [`MockFileSystem`] serves
//! canned directory trees from memory so collection logic can be tested
//! without network access:
//!
//! ```
//! use qumulo::backend::{FileSystem, MockFileSystem};
//! use qumulo::{DirAggregates, FileRef};
//!
//! let mut mock = MockFileSystem::new("lab");
//! mock.add_directory(DirAggregates::new("/data", 10).with_usage(30, 20, 10));
//!
//! let agg = mock.aggregates(&FileRef::path("/data")).unwrap();
//! assert_eq!(agg.total_data, 20);
//! ```

pub mod rest;

use crate::error::{Error, Result};
use crate::types::{DirAggregates, FileAttributes, FileId, FileRef, FileType};
use std::collections::{HashMap, HashSet, VecDeque};

/// Read-only view of the cluster's hierarchical statistics API.
pub trait FileSystem {
    /// Aggregates for a single directory, including its immediate `files`.
    fn aggregates(&self, file: &FileRef) -> Result<DirAggregates>;

    /// Aggregates for a directory and every directory below it, down to
    /// `max_depth` levels.
    fn recursive_aggregates(&self, file: &FileRef, max_depth: u32) -> Result<Vec<DirAggregates>>;

    /// Attributes of a file, used to resolve an id to its canonical path.
    fn attributes(&self, file: &FileRef) -> Result<FileAttributes>;

    /// Name of the cluster, as configured on the cluster itself.
    fn cluster_name(&self) -> Result<String>;
}

/// In-memory [`FileSystem`] for tests.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    cluster_name: String,
    directories: HashMap<FileId, DirAggregates>,
    attributes: HashMap<FileId, FileAttributes>,
    ids_by_path: HashMap<String, FileId>,
    failing: HashSet<String>,
}

impl MockFileSystem {
    /// Create an empty mock cluster.
    #[must_use]
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            ..Self::default()
        }
    }

    /// Register a directory and every entry in its `files` list.
    ///
    /// Entries are given the path `<directory>/<name>` unless they were
    /// registered earlier under their own path.
    pub fn add_directory(&mut self, aggregates: DirAggregates) {
        let dir_path = aggregates.path.clone();
        self.register(aggregates.id, &dir_path, FileType::Directory);

        for file in &aggregates.files {
            if self.attributes.contains_key(&file.id) {
                continue;
            }
            let child_path = format!("{}/{}", dir_path.trim_end_matches('/'), file.name);
            self.register(file.id, &child_path, file.file_type.clone());
        }

        self.directories.insert(aggregates.id, aggregates);
    }

    /// Change the path a directory reports inline in its aggregates, leaving
    /// the path its attributes resolve to untouched.
    pub fn set_inline_path(&mut self, id: FileId, path: impl Into<String>) {
        if let Some(dir) = self.directories.get_mut(&id) {
            dir.path = path.into();
        }
    }

    /// Make every query that addresses `path` fail with a network error.
    pub fn fail_path(&mut self, path: impl Into<String>) {
        self.failing.insert(path.into());
    }

    fn register(&mut self, id: FileId, path: &str, file_type: FileType) {
        self.ids_by_path.insert(path.to_string(), id);
        self.attributes.insert(
            id,
            FileAttributes {
                path: path.to_string(),
                id,
                file_type,
            },
        );
    }

    fn resolve_id(&self, file: &FileRef) -> Result<FileId> {
        let id = match file {
            FileRef::Id(id) => *id,
            FileRef::Path(path) => *self
                .ids_by_path
                .get(path)
                .ok_or_else(|| Error::NotFound(path.clone()))?,
        };

        if let Some(attrs) = self.attributes.get(&id) {
            if self.failing.contains(&attrs.path) {
                return Err(Error::http("mock: connection reset", None));
            }
        }
        Ok(id)
    }
}

impl FileSystem for MockFileSystem {
    fn aggregates(&self, file: &FileRef) -> Result<DirAggregates> {
        let id = self.resolve_id(file)?;
        self.directories
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(file.to_string()))
    }

    fn recursive_aggregates(&self, file: &FileRef, max_depth: u32) -> Result<Vec<DirAggregates>> {
        let root = self.aggregates(file)?;
        let mut records = Vec::new();
        let mut queue = VecDeque::from([(root, 0u32)]);

        while let Some((dir, depth)) = queue.pop_front() {
            if depth < max_depth {
                for child in dir.files.iter().filter(|f| f.file_type.is_directory()) {
                    if let Some(sub) = self.directories.get(&child.id) {
                        queue.push_back((sub.clone(), depth + 1));
                    }
                }
            }
            records.push(dir);
        }

        Ok(records)
    }

    fn attributes(&self, file: &FileRef) -> Result<FileAttributes> {
        let id = self.resolve_id(file)?;
        self.attributes
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(file.to_string()))
    }

    fn cluster_name(&self) -> Result<String> {
        Ok(self.cluster_name.clone())
    }
}
