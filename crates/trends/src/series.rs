//! Flattening aggregates into per-directory metric tuples.
//!
//! The time-series mode reports absolute numbers for the root and for every
//! directory below it down to the configured depth. Child entries only carry
//! an id, so each tuple's path comes from a separate attributes lookup.

use crate::aggregate::{ChildEntry, DirectoryAggregate};
use crate::collect::{collect, resolve_path};
use crate::error::CollectionError;
use qumulo::{FileId, FileRef, FileSystem};

/// Absolute metrics for one directory, in raw units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTuple {
    pub path: String,
    pub capacity: u64,
    pub data: u64,
    pub metadata: u64,
    pub dir_count: u64,
    pub file_count: u64,
}

impl MetricTuple {
    fn from_aggregate(agg: &DirectoryAggregate) -> Self {
        Self {
            path: agg.path.clone(),
            capacity: agg.capacity_bytes,
            data: agg.data_bytes,
            metadata: agg.metadata_bytes,
            dir_count: agg.directory_count,
            file_count: agg.file_count,
        }
    }

    fn from_child(path: String, child: &ChildEntry) -> Self {
        Self {
            path,
            capacity: child.capacity_bytes,
            data: child.data_bytes,
            metadata: child.metadata_bytes,
            dir_count: child.directory_count,
            file_count: child.file_count,
        }
    }
}

/// One tuple for `aggregate` itself, plus one per child directory unless
/// `max_depth` is zero. Non-directory children are skipped.
pub fn flatten<F: FileSystem + ?Sized>(
    aggregate: &DirectoryAggregate,
    max_depth: u32,
    fs: &F,
) -> qumulo::Result<Vec<MetricTuple>> {
    let mut tuples = vec![MetricTuple::from_aggregate(aggregate)];
    if max_depth != 0 {
        tuples.extend(child_tuples(&aggregate.children, fs)?);
    }
    Ok(tuples)
}

/// Report `root` and every directory down to `max_depth` levels below it.
///
/// Level one comes from the root's inline children; each deeper level is
/// read from its parent's aggregates, addressed by id. Every directory is
/// reported exactly once.
pub fn walk<F: FileSystem + ?Sized>(
    fs: &F,
    root: &str,
    max_depth: u32,
) -> Result<Vec<MetricTuple>, CollectionError> {
    let top = collect(fs, root, max_depth, false)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            CollectionError::new(root, qumulo::Error::InvalidResponse("empty aggregates".into()))
        })?;

    let mut tuples = flatten(&top, max_depth, fs).map_err(|e| CollectionError::new(root, e))?;

    let mut frontier: Vec<FileId> = top.child_directories().map(|c| c.id).collect();
    let mut depth = 1;
    while depth < max_depth && !frontier.is_empty() {
        let mut next = Vec::new();
        for id in frontier {
            let children: Vec<ChildEntry> = fs
                .aggregates(&FileRef::Id(id))
                .map_err(|e| CollectionError::new(root, e))?
                .files
                .into_iter()
                .map(ChildEntry::from)
                .collect();

            tuples.extend(child_tuples(&children, fs).map_err(|e| CollectionError::new(root, e))?);
            next.extend(children.iter().filter(|c| c.is_directory()).map(|c| c.id));
        }
        frontier = next;
        depth += 1;
    }

    log::debug!("{}: {} directories flattened", root, tuples.len());
    Ok(tuples)
}

fn child_tuples<F: FileSystem + ?Sized>(
    children: &[ChildEntry],
    fs: &F,
) -> qumulo::Result<Vec<MetricTuple>> {
    children
        .iter()
        .filter(|c| c.is_directory())
        .map(|c| Ok(MetricTuple::from_child(resolve_path(fs, c.id)?, c)))
        .collect()
}
