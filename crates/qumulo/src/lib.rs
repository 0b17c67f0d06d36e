//! # qumulo
//!
//! Blocking client for the parts of the Qumulo REST API that report
//! directory capacity.
//!
//! This crate provides:
//! - The [`FileSystem`] trait: aggregates, recursive aggregates, attribute
//!   lookup and the cluster name
//! - [`RestClient`], the HTTP implementation (ureq)
//! - [`MockFileSystem`], an in-memory implementation for tests
//!
//! ## Example
//!
//! ```no_run
//! use qumulo::{FileRef, FileSystem, RestClient};
//!
//! let mut client = RestClient::new("qumulo.local", 8000, false);
//! client.login("admin", "secret")?;
//!
//! let agg = client.aggregates(&FileRef::path("/data"))?;
//! println!("{} bytes of data in {}", agg.total_data, agg.path);
//!
//! // Child entries only carry ids; resolve them to canonical paths.
//! for child in agg.files.iter().filter(|f| f.file_type.is_directory()) {
//!     let attrs = client.attributes(&FileRef::Id(child.id))?;
//!     println!("  {}", attrs.path);
//! }
//! # Ok::<(), qumulo::Error>(())
//! ```

#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::rest::{DEFAULT_PORT, RestClient};
pub use backend::{FileSystem, MockFileSystem};
pub use error::{Error, ErrorCategory, Result};
pub use types::{DirAggregates, FileAggregate, FileAttributes, FileId, FileRef, FileType};
