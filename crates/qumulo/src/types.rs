//! Response types for the filesystem aggregates API.
//!
//! The cluster encodes every 64-bit quantity (ids, byte counts, file counts)
//! as a decimal string, so numeric fields go through [`de::u64_lenient`],
//! which accepts either a string or a bare JSON number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a file or directory on the cluster.
pub type FileId = u64;

/// How a file is addressed in an API call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileRef {
    /// Address by numeric file id.
    Id(FileId),
    /// Address by absolute path.
    Path(String),
}

impl FileRef {
    /// Address a file by absolute path.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// The URL segment used for this reference (ids verbatim, paths
    /// percent-encoded so `/` becomes `%2F`).
    #[must_use]
    pub fn url_segment(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Path(path) => percent_encode(path),
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {}", id),
            Self::Path(path) => write!(f, "{}", path),
        }
    }
}

/// File type tag as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileType {
    /// `FS_FILE_TYPE_DIRECTORY`
    Directory,
    /// `FS_FILE_TYPE_FILE`
    File,
    /// `FS_FILE_TYPE_SYMLINK`
    Symlink,
    /// Any other tag, kept verbatim.
    Other(String),
}

impl FileType {
    /// The wire tag for this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Directory => "FS_FILE_TYPE_DIRECTORY",
            Self::File => "FS_FILE_TYPE_FILE",
            Self::Symlink => "FS_FILE_TYPE_SYMLINK",
            Self::Other(tag) => tag,
        }
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl From<String> for FileType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "FS_FILE_TYPE_DIRECTORY" => Self::Directory,
            "FS_FILE_TYPE_FILE" => Self::File,
            "FS_FILE_TYPE_SYMLINK" => Self::Symlink,
            _ => Self::Other(tag),
        }
    }
}

impl From<FileType> for String {
    fn from(file_type: FileType) -> Self {
        file_type.as_str().to_string()
    }
}

/// Aggregated statistics for one directory, as returned by the
/// `aggregates/` and `recursive-aggregates/` endpoints.
///
/// `files` lists the directory's immediate entries with their own
/// subtotals; an entry's totals are not repeated in any sibling's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirAggregates {
    pub path: String,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: FileId,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub total_capacity: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub total_data: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub total_meta: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub total_files: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub total_directories: u64,
    #[serde(default)]
    pub files: Vec<FileAggregate>,
}

/// One entry in a directory's `files` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAggregate {
    pub name: String,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: FileId,
    #[serde(rename = "type")]
    pub file_type: FileType,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub capacity_usage: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub data_usage: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub meta_usage: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub num_files: u64,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub num_directories: u64,
}

/// Subset of `info/attributes` we need: the canonical path of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttributes {
    pub path: String,
    #[serde(deserialize_with = "de::u64_lenient")]
    pub id: FileId,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

impl DirAggregates {
    /// An empty aggregate record, mostly useful for building fixtures.
    pub fn new(path: impl Into<String>, id: FileId) -> Self {
        Self {
            path: path.into(),
            id,
            total_capacity: 0,
            total_data: 0,
            total_meta: 0,
            total_files: 0,
            total_directories: 0,
            files: Vec::new(),
        }
    }

    /// Set capacity, data and metadata byte totals.
    pub fn with_usage(mut self, capacity: u64, data: u64, meta: u64) -> Self {
        self.total_capacity = capacity;
        self.total_data = data;
        self.total_meta = meta;
        self
    }

    /// Set file and directory counts.
    pub fn with_counts(mut self, files: u64, directories: u64) -> Self {
        self.total_files = files;
        self.total_directories = directories;
        self
    }

    /// Append an entry to the `files` list.
    pub fn with_file(mut self, file: FileAggregate) -> Self {
        self.files.push(file);
        self
    }
}

impl FileAggregate {
    pub fn new(name: impl Into<String>, id: FileId, file_type: FileType) -> Self {
        Self {
            name: name.into(),
            id,
            file_type,
            capacity_usage: 0,
            data_usage: 0,
            meta_usage: 0,
            num_files: 0,
            num_directories: 0,
        }
    }

    /// Set capacity, data and metadata byte usage.
    pub fn with_usage(mut self, capacity: u64, data: u64, meta: u64) -> Self {
        self.capacity_usage = capacity;
        self.data_usage = data;
        self.meta_usage = meta;
        self
    }

    /// Set file and directory counts.
    pub fn with_counts(mut self, files: u64, directories: u64) -> Self {
        self.num_files = files;
        self.num_directories = directories;
        self
    }
}

/// Encode everything outside the RFC 3986 unreserved set.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub(crate) mod de {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Number(u64),
        String(String),
    }

    /// Accept `"123"` or `123`.
    pub fn u64_lenient<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::Number(n) => Ok(n),
            StringOrNumber::String(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected an integer, got {:?}", s))),
        }
    }
}
