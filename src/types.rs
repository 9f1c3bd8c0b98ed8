//! Core types for the file system index and its derived views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one stored object, keyed by its full normalized path
/// (slash-separated, no leading slash).
///
/// Wire names match the store's listing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    /// Full normalized path of the object, e.g. `reports/2024/q3.pdf`.
    pub path: String,
    /// Object size in bytes.
    pub size: u64,
    /// Upload timestamp reported by the store.
    pub uploaded_at: DateTime<Utc>,
    /// Opaque version identifier issued by the store per object.
    pub entity_tag: String,
}

/// A synthesized directory reference inside a directory listing.
///
/// Directories have no stored representation; they are inferred from longer
/// paths sharing a prefix. `path` is absolute with a leading slash so it can
/// be fed straight back into navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRef {
    pub name: String,
    pub path: String,
}

/// Immediate contents of one directory: subdirectories and files, each
/// sorted ascending by name (lexicographic, case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryContents {
    pub directories: Vec<DirectoryRef>,
    pub files: Vec<ObjectEntry>,
}

/// One node of the directory skeleton returned by folder-structure queries.
/// Covers directories only; pure leaf files never appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: String,
    pub path: String,
    pub children: Vec<FolderNode>,
}

/// One file handed to an upload operation.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Base name the object will get under the target directory.
    pub name: String,
    pub bytes: Vec<u8>,
    /// Media type sent to the store, e.g. `application/pdf`.
    pub content_type: String,
}

/// Load state of the synchronization layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// No listing fetched yet; the first navigation triggers one.
    Uninitialized,
    /// Full listing fetch in flight.
    Loading,
    /// Index populated; navigation served from memory.
    Ready,
    /// Initial load failed. Message preserved for display; only an explicit
    /// reload recovers.
    Error(String),
}
