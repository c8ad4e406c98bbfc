//! Wire types shared by the LedgerDrive client crates.
//!
//! Everything here is plain data: asset descriptors sent when creating
//! assets, records returned by the backend, and the RPC envelope that
//! carries them.

pub mod constants;
pub mod envelope;
pub mod messages;
pub mod types;

pub use constants::Method;
pub use envelope::{Message, RpcError};
pub use types::{
    AssetDescriptor, AssetId, AssetRecord, AssetRef, AssetTreeNode, ChunkId, DirectoryAsset,
    DirectoryRecord, FileAsset, FileRecord, Metadata, Permission,
};
