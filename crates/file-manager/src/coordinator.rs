//! Upload coordinator.
//!
//! Drives one upload from file selection to settlement:
//! `Idle → AssetsSubmitted → Splitting → Dispatching → Settled`.
//! Only a rejected asset tree fails the call; per-file and per-batch
//! problems are logged and the session settles regardless.

use std::sync::Arc;

use futures_util::future::join_all;
use ledgerdrive_protocol::messages::{
    AddAssetsRequest, AddAssetsResponse, AddChunksRequest, ChunkPayload, CreatedFile,
};
use ledgerdrive_protocol::{AssetId, AssetTreeNode, FileRecord, Method};
use ledgerdrive_transfer::{
    Chunk, SessionFile, UploadBatch, UploadSession, group_into_batches, split_into_chunks,
};
use tracing::{debug, error, info, warn};

use crate::backend::{self, BackendConnection};
use crate::error::FileManagerError;
use crate::mapper::map_selected_files;
use crate::selected::SelectedFile;
use crate::types::{UploadLimits, UploadSummary};

/// Uploads selected files through a backend connection.
pub struct UploadCoordinator<'a> {
    conn: &'a dyn BackendConnection,
    limits: UploadLimits,
    session: Arc<UploadSession>,
}

impl<'a> UploadCoordinator<'a> {
    /// Creates a coordinator with a fresh idle session.
    pub fn new(conn: &'a dyn BackendConnection, limits: UploadLimits) -> Self {
        Self {
            conn,
            limits,
            session: Arc::new(UploadSession::new(uuid::Uuid::new_v4().to_string())),
        }
    }

    /// Returns a handle to the session for progress observers.
    ///
    /// The same session is reused by every upload of this coordinator.
    pub fn session(&self) -> Arc<UploadSession> {
        Arc::clone(&self.session)
    }

    /// Uploads `files` under `parent_id` (root when `None`).
    ///
    /// Returns once every chunk batch has resolved. Errors only when the
    /// upload is refused before any chunk is sent. Only one upload runs per
    /// coordinator at a time.
    pub async fn begin_upload(
        &mut self,
        parent_id: Option<AssetId>,
        files: Vec<SelectedFile>,
    ) -> Result<UploadSummary, FileManagerError> {
        let selection = map_selected_files(files);
        self.limits
            .check(self.conn.principal(), selection.total_bytes)?;

        let created = self.submit_assets(parent_id, selection.assets).await?;
        let bound = bind_created_files(&created, &selection.files);

        self.session.assets_submitted(
            bound
                .iter()
                .map(|(file, record)| SessionFile {
                    label: file.label().to_string(),
                    chunks: record.chunks.clone(),
                })
                .collect(),
        );

        self.session.start_splitting();
        let chunks = split_files(&bound).await;
        let chunk_count = chunks.len();
        let batches = group_into_batches(chunks);
        let batch_count = batches.len();

        self.session.start_dispatching(chunk_count);
        info!(
            session = %self.session.id(),
            files = bound.len(),
            chunks = chunk_count,
            batches = batch_count,
            "dispatching chunk batches"
        );
        let failed_batches = self.dispatch(batches).await;
        self.session.settle();

        if failed_batches > 0 {
            warn!(failed_batches, batches = batch_count, "upload settled with failed batches");
        } else {
            info!(batches = batch_count, "upload settled");
        }

        Ok(UploadSummary {
            files_created: created.len(),
            files_bound: bound.len(),
            chunks: chunk_count,
            batches: batch_count,
            failed_batches,
        })
    }

    /// Creates the asset tree on the backend.
    async fn submit_assets(
        &self,
        parent_id: Option<AssetId>,
        assets: Vec<AssetTreeNode>,
    ) -> Result<Vec<CreatedFile>, FileManagerError> {
        let req = AddAssetsRequest { parent_id, assets };
        match backend::request::<AddAssetsResponse>(self.conn, Method::AddAssets, &req).await {
            Ok(resp) => {
                debug!(files = resp.files.len(), "asset tree accepted");
                Ok(resp.files)
            }
            Err(e) => {
                error!(error = %e, "asset tree rejected");
                self.session.reset();
                Err(FileManagerError::TreeSubmission(e.to_string()))
            }
        }
    }

    /// Sends every batch concurrently and returns how many failed.
    async fn dispatch(&self, batches: Vec<UploadBatch>) -> usize {
        let sends = batches
            .into_iter()
            .enumerate()
            .map(|(index, batch)| self.send_batch(index, batch));

        join_all(sends).await.into_iter().filter(|ok| !ok).count()
    }

    async fn send_batch(&self, index: usize, batch: UploadBatch) -> bool {
        let ids = batch.ids();
        let bytes = batch.byte_len();
        let req = AddChunksRequest {
            chunks: batch
                .into_chunks()
                .into_iter()
                .map(|c| ChunkPayload {
                    id: c.id,
                    data: c.bytes,
                })
                .collect(),
        };

        self.session.batch_started(&ids);
        let result = backend::send(self.conn, Method::AddChunks, &req).await;
        self.session.batch_finished(&ids);

        match result {
            Ok(_) => {
                debug!(batch = index, chunks = ids.len(), bytes, "chunk batch stored");
                true
            }
            Err(e) => {
                warn!(batch = index, chunks = ids.len(), error = %e, "chunk batch failed");
                false
            }
        }
    }
}

/// Pairs every created file with the selected file it came from.
///
/// Matching is by (relative path, size, name); the first match wins, so
/// two selected files identical in all three are indistinguishable.
fn bind_created_files<'s>(
    created: &[CreatedFile],
    files: &'s [SelectedFile],
) -> Vec<(&'s SelectedFile, FileRecord)> {
    created
        .iter()
        .filter_map(|c| {
            let found = files.iter().find(|f| {
                f.relative_path == c.origin_path && f.size == c.file.size && f.name == c.file.name
            });
            if found.is_none() {
                let err = FileManagerError::Binding {
                    path: c.origin_path.clone(),
                    name: c.file.name.clone(),
                    size: c.file.size,
                };
                warn!(error = %err, "skipping unbound file");
            }
            found.map(|f| (f, c.file.clone()))
        })
        .collect()
}

/// Reads and splits every bound file, keeping file order.
///
/// A file that cannot be read, or whose content does not match its chunk
/// slots, contributes no chunks.
async fn split_files(bound: &[(&SelectedFile, FileRecord)]) -> Vec<Chunk> {
    let reads = bound.iter().map(|(file, _)| file.read_all());
    let contents = join_all(reads).await;

    let mut chunks = Vec::new();
    for ((file, record), content) in bound.iter().zip(contents) {
        let data = match content {
            Ok(data) => data,
            Err(e) => {
                error!(file = %file.label(), error = %e, "failed to read file");
                continue;
            }
        };
        match split_into_chunks(&data, &record.chunks) {
            Ok(file_chunks) => chunks.extend(file_chunks),
            Err(e) => {
                error!(file = %file.label(), error = %e, "skipping file chunks");
            }
        }
    }
    chunks
}
