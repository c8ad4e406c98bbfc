//! Upload pipeline and asset management for the LedgerDrive backend.
//!
//! This crate holds the **business logic** of the file manager. It has no
//! transport dependency: callers provide a [`BackendConnection`] that
//! carries RPC messages to the backend.
//!
//! # Upload pipeline
//!
//! 1. **Map**: selected files become a nested asset tree
//! 2. **Submit**: the tree is created on the backend, which issues chunk ids
//! 3. **Split**: file content is cut into chunks bound to those ids
//! 4. **Batch**: chunks are packed into size-bounded batches
//! 5. **Dispatch**: all batches are sent concurrently while the session
//!    tracks which chunk ids are in flight

pub mod assets;
pub mod backend;
pub mod coordinator;
pub mod error;
pub mod mapper;
pub mod scanner;
pub mod selected;
pub mod types;

// Re-export primary types for convenience.
pub use assets::{AssetManager, directory_totals, find_asset, is_modifiable_by};
pub use backend::BackendConnection;
pub use coordinator::UploadCoordinator;
pub use error::FileManagerError;
pub use mapper::map_selected_files;
pub use scanner::scan_selection;
pub use selected::{FileContent, SelectedFile, detect_mime_type};
pub use types::{DirectoryTotals, MappedSelection, UploadLimits, UploadSummary};
