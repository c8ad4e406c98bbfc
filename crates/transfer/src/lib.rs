//! Client-side upload pipeline primitives.
//!
//! Splits file bytes into backend-addressed chunks, packs chunks into
//! size-bounded batches, and keeps the per-session bookkeeping that
//! progress observers read while batches are in flight.

mod batch;
mod chunked;
mod progress;
mod types;

pub use batch::group_into_batches;
pub use chunked::{expected_chunk_count, split_into_chunks};
pub use progress::{ProgressCallback, ProgressTracker};
pub use types::{Chunk, SessionFile, UploadBatch, UploadProgress, UploadSession, UploadState};

/// Size of every chunk except the last one of a file.
pub const CHUNK_SIZE: usize = 999_999;

/// A batch is closed before its combined chunk bytes would reach this value.
pub const BATCH_BYTE_LIMIT: usize = 2_000_000;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The backend issued a different number of chunk ids than the
    /// file's content splits into.
    #[error("chunk count mismatch: {expected} ids issued, {actual} chunks produced")]
    ChunkMismatch { expected: usize, actual: usize },
}
