use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend identifier of a file or directory.
pub type AssetId = u64;

/// Backend-issued identifier of one chunk slot of one file.
///
/// Values can exceed 2^53, so they travel as decimal strings in JSON.
/// Plain JSON numbers are still accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u128);

/// Error returned when a chunk identifier is not a decimal integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chunk id: {0:?}")]
pub struct ParseChunkIdError(pub String);

impl FromStr for ChunkId {
    type Err = ParseChunkIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u128>()
            .map(ChunkId)
            .map_err(|_| ParseChunkIdError(s.to_string()))
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ChunkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ChunkId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(ChunkId(u128::from(n))),
        }
    }
}

/// Visibility of an asset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    #[default]
    Public,
    Private,
}

// ---------------------------------------------------------------------------
// Assets to create
// ---------------------------------------------------------------------------

/// A file that does not exist on the backend yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAsset {
    pub name: String,
    pub extension: String,
    pub size: u64,
    #[serde(default)]
    pub permission: Permission,
    pub chunk_count: u64,
    #[serde(default)]
    pub mime_type: String,
    /// Relative path the file was selected with (empty for flat selections).
    #[serde(default)]
    pub origin_path: String,
}

/// A directory that does not exist on the backend yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryAsset {
    pub name: String,
    #[serde(default)]
    pub permission: Permission,
}

/// Asset descriptor, externally tagged as `{"File": ..}` or `{"Directory": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetDescriptor {
    File(FileAsset),
    Directory(DirectoryAsset),
}

impl AssetDescriptor {
    pub fn name(&self) -> &str {
        match self {
            AssetDescriptor::File(f) => &f.name,
            AssetDescriptor::Directory(d) => &d.name,
        }
    }
}

/// One node of the nested asset tree submitted to `add_assets`.
///
/// `children` is only meaningful for directories and stays empty for files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTreeNode {
    pub asset: AssetDescriptor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AssetTreeNode>,
}

impl AssetTreeNode {
    /// Creates a leaf node for a file.
    pub fn file(asset: FileAsset) -> Self {
        Self {
            asset: AssetDescriptor::File(asset),
            children: Vec::new(),
        }
    }

    /// Creates an empty public directory node.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            asset: AssetDescriptor::Directory(DirectoryAsset {
                name: name.into(),
                permission: Permission::Public,
            }),
            children: Vec::new(),
        }
    }

    /// Returns the directory name if this node is a directory.
    pub fn directory_name(&self) -> Option<&str> {
        match &self.asset {
            AssetDescriptor::Directory(d) => Some(&d.name),
            AssetDescriptor::File(_) => None,
        }
    }

    /// Returns the file descriptor if this node is a file.
    pub fn as_file(&self) -> Option<&FileAsset> {
        match &self.asset {
            AssetDescriptor::File(f) => Some(f),
            AssetDescriptor::Directory(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Records returned by the backend
// ---------------------------------------------------------------------------

/// A file stored on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub extension: String,
    pub size: u64,
    #[serde(default)]
    pub mime_type: String,
    /// Chunk slots in byte order.
    #[serde(default)]
    pub chunks: Vec<ChunkId>,
    #[serde(default)]
    pub owner: String,
    /// Public path the file is served under.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_protected: bool,
    /// Creation time in nanoseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub parent_id: Option<AssetId>,
}

/// A directory stored on the backend, with its children inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub id: AssetId,
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub permission: Permission,
    #[serde(default)]
    pub parent_id: Option<AssetId>,
    #[serde(default)]
    pub children: Vec<AssetRecord>,
}

/// A stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetRecord {
    File(FileRecord),
    Directory(DirectoryRecord),
}

impl AssetRecord {
    pub fn id(&self) -> AssetId {
        match self {
            AssetRecord::File(f) => f.id,
            AssetRecord::Directory(d) => d.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AssetRecord::File(f) => &f.name,
            AssetRecord::Directory(d) => &d.name,
        }
    }
}

/// Reference to an existing asset by kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetRef {
    File(AssetId),
    Directory(AssetId),
}

/// Aggregate usage statistics of the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub cycles: u128,
    #[serde(default)]
    pub heap_memory: u64,
    #[serde(default)]
    pub files_combined_bytes: u64,
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub directory_count: u64,
}
