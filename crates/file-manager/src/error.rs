//! File manager error types.

use ledgerdrive_protocol::Method;

/// Errors produced by the file manager.
#[derive(Debug, thiserror::Error)]
pub enum FileManagerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend error {code}: {message}")]
    Backend { code: i32, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("empty {0} response")]
    EmptyResponse(Method),

    #[error("asset tree rejected: {0}")]
    TreeSubmission(String),

    #[error("no selected file matches created file {name:?} at {path:?} ({size} bytes)")]
    Binding { path: String, name: String, size: u64 },

    #[error("upload of {total_bytes} bytes exceeds the {limit} byte limit")]
    UploadLimit { total_bytes: u64, limit: u64 },

    #[error("invalid asset name: {0:?}")]
    InvalidName(String),

    #[error("transfer error: {0}")]
    Transfer(#[from] ledgerdrive_transfer::TransferError),
}
