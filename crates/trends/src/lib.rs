//! # Trends
//!
//! Capacity aggregation and delta engine for directory trend reports.
//!
//! This crate provides functionality to:
//! - Collect per-directory capacity aggregates from a cluster, down to a
//!   bounded depth ([`collect`], [`walk`])
//! - Persist the last observed usage per directory ([`SnapshotStore`])
//! - Compute signed changes since the previous run ([`compute_deltas`])
//!
//! ## Example
//!
//! ```no_run
//! use trends::{SnapshotStore, collect, compute_deltas};
//!
//! # fn demo(fs: &dyn qumulo::FileSystem) -> Result<(), Box<dyn std::error::Error>> {
//! let store = SnapshotStore::new("./config/previous_dir_usages.json");
//! let mut snapshot = store.load_or_default()?;
//!
//! let aggregates = collect(fs, "/data", 1, true)?;
//! for record in compute_deltas(&aggregates, &mut snapshot) {
//!     println!("{}: {:?}", record.path, record.change);
//! }
//!
//! store.save(&snapshot)?;
//! # Ok(())
//! # }
//! ```

mod aggregate;
mod collect;
mod delta;
mod error;
mod series;
mod snapshot;
pub mod units;

pub use aggregate::{ChildEntry, DirectoryAggregate};
pub use collect::{collect, resolve_path};
pub use delta::{Change, DeltaRecord, DeltaSummary, compute_deltas};
pub use error::{CollectionError, SnapshotError};
pub use series::{MetricTuple, flatten, walk};
pub use snapshot::{Snapshot, SnapshotEntry, SnapshotStore};
