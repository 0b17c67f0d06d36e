//! Collecting directory aggregates from the cluster.
//!
//! Collection is a two-step lookup: aggregate records come back with ids,
//! and each id is resolved to a canonical path through the attributes
//! endpoint before it is used as a snapshot key or a series tag.

use crate::aggregate::DirectoryAggregate;
use crate::error::CollectionError;
use qumulo::{FileId, FileRef, FileSystem};

/// Collect aggregates for one root path.
///
/// With `recursive` set and a non-zero `max_depth`, every directory down to
/// `max_depth` levels below `root` becomes its own [`DirectoryAggregate`].
/// Otherwise exactly one aggregate (the root, with its inline children) is
/// returned. Failures are not retried.
pub fn collect<F: FileSystem + ?Sized>(
    fs: &F,
    root: &str,
    max_depth: u32,
    recursive: bool,
) -> Result<Vec<DirectoryAggregate>, CollectionError> {
    let root_ref = FileRef::path(root);

    let records = if recursive && max_depth > 0 {
        fs.recursive_aggregates(&root_ref, max_depth)
            .map_err(|e| CollectionError::new(root, e))?
    } else {
        vec![
            fs.aggregates(&root_ref)
                .map_err(|e| CollectionError::new(root, e))?,
        ]
    };

    log::debug!("{}: {} aggregate record(s)", root, records.len());

    records
        .into_iter()
        .map(|record| {
            let path = resolve_path(fs, record.id).map_err(|e| CollectionError::new(root, e))?;
            Ok(DirectoryAggregate::from_record(path, record))
        })
        .collect()
}

/// Resolve a file id to its canonical path.
pub fn resolve_path<F: FileSystem + ?Sized>(fs: &F, id: FileId) -> qumulo::Result<String> {
    Ok(fs.attributes(&FileRef::Id(id))?.path)
}
