//! Per-directory capacity observations.

use crate::units::bytes_to_gb;
use qumulo::{DirAggregates, FileAggregate, FileId, FileType};

/// One capacity observation for a single directory at a point in time.
///
/// Built fresh from each query response and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryAggregate {
    /// Canonical absolute path, as resolved from the directory's id.
    pub path: String,
    pub id: FileId,
    pub data_bytes: u64,
    pub metadata_bytes: u64,
    pub capacity_bytes: u64,
    pub file_count: u64,
    pub directory_count: u64,
    /// Immediate entries returned inline with the aggregate.
    pub children: Vec<ChildEntry>,
}

impl DirectoryAggregate {
    /// Build from an API record whose path has already been resolved.
    pub fn from_record(path: impl Into<String>, record: DirAggregates) -> Self {
        Self {
            path: path.into(),
            id: record.id,
            data_bytes: record.total_data,
            metadata_bytes: record.total_meta,
            capacity_bytes: record.total_capacity,
            file_count: record.total_files,
            directory_count: record.total_directories,
            children: record.files.into_iter().map(ChildEntry::from).collect(),
        }
    }

    /// Data usage in GB, rounded to two decimals.
    #[must_use]
    pub fn data_gb(&self) -> f64 {
        bytes_to_gb(self.data_bytes)
    }

    /// Metadata usage in GB, rounded to two decimals.
    #[must_use]
    pub fn metadata_gb(&self) -> f64 {
        bytes_to_gb(self.metadata_bytes)
    }

    /// Children tagged as directories.
    pub fn child_directories(&self) -> impl Iterator<Item = &ChildEntry> {
        self.children.iter().filter(|c| c.is_directory())
    }
}

/// An entry listed inline under a directory aggregate.
///
/// Only the id is trustworthy for addressing; the canonical path has to be
/// looked up separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub id: FileId,
    pub name: String,
    pub file_type: FileType,
    pub capacity_bytes: u64,
    pub data_bytes: u64,
    pub metadata_bytes: u64,
    pub file_count: u64,
    pub directory_count: u64,
}

impl ChildEntry {
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.file_type.is_directory()
    }
}

impl From<FileAggregate> for ChildEntry {
    fn from(f: FileAggregate) -> Self {
        Self {
            id: f.id,
            name: f.name,
            file_type: f.file_type,
            capacity_bytes: f.capacity_usage,
            data_bytes: f.data_usage,
            metadata_bytes: f.meta_usage,
            file_count: f.num_files,
            directory_count: f.num_directories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record() {
        let record = DirAggregates::new("/data/", 7)
            .with_usage(15_000_000_000, 12_000_000_000, 1_500_000_000)
            .with_counts(10, 2)
            .with_file(FileAggregate::new("a", 8, FileType::Directory))
            .with_file(FileAggregate::new("b.txt", 9, FileType::File));

        let agg = DirectoryAggregate::from_record("/data", record);
        assert_eq!(agg.path, "/data");
        assert_eq!(agg.capacity_bytes, 15_000_000_000);
        assert_eq!(agg.data_gb(), 12.0);
        assert_eq!(agg.metadata_gb(), 1.5);
        assert_eq!(agg.file_count, 10);
        assert_eq!(agg.directory_count, 2);
        assert_eq!(agg.children.len(), 2);
        assert_eq!(agg.child_directories().count(), 1);
    }
}
