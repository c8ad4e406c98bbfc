use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use ledgerdrive_protocol::ChunkId;
use serde::Serialize;

/// A slice of file content bound to its backend-issued slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    pub bytes: Vec<u8>,
}

/// Chunks sent together in one `add_chunks` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    chunks: Vec<Chunk>,
    byte_len: usize,
}

impl UploadBatch {
    pub(crate) fn push(&mut self, chunk: Chunk) {
        self.byte_len += chunk.bytes.len();
        self.chunks.push(chunk);
    }

    /// Combined byte length of all chunks.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunk ids in batch order.
    pub fn ids(&self) -> Vec<ChunkId> {
        self.chunks.iter().map(|c| c.id).collect()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }
}

/// Lifecycle of an upload session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    AssetsSubmitted,
    Splitting,
    Dispatching,
    Settled,
}

impl UploadState {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadState::Idle => "idle",
            UploadState::AssetsSubmitted => "assets_submitted",
            UploadState::Splitting => "splitting",
            UploadState::Dispatching => "dispatching",
            UploadState::Settled => "settled",
        }
    }
}

impl std::fmt::Display for UploadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file bound to the chunk slots the backend issued for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFile {
    /// Relative path, or the bare name for flat selections.
    pub label: String,
    pub chunks: Vec<ChunkId>,
}

/// Snapshot of a session for progress observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub session_id: String,
    pub state: UploadState,
    pub total_chunks_to_process: usize,
    pub in_flight_chunks: usize,
    pub file_count: usize,
}

/// Bookkeeping for one upload operation (thread-safe).
///
/// Every mutation is a single write-locked read-modify-write, so batch
/// completions resolving back to back never lose each other's updates.
pub struct UploadSession {
    inner: RwLock<SessionInner>,
}

struct SessionInner {
    id: String,
    state: UploadState,
    files: Vec<SessionFile>,
    total_chunks_to_process: usize,
    in_flight: HashSet<ChunkId>,
    started_at: Option<Instant>,
    updated_at: Instant,
}

impl UploadSession {
    /// Creates an idle session.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(SessionInner {
                id: id.into(),
                state: UploadState::Idle,
                files: Vec::new(),
                total_chunks_to_process: 0,
                in_flight: HashSet::new(),
                started_at: None,
                updated_at: Instant::now(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        let mut s = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        s.updated_at = Instant::now();
        s
    }

    /// Records the files the backend accepted and their chunk slots.
    pub fn assets_submitted(&self, files: Vec<SessionFile>) {
        let mut s = self.write();
        s.state = UploadState::AssetsSubmitted;
        s.started_at = Some(s.updated_at);
        s.files = files;
    }

    /// Marks the session as reading and splitting file content.
    pub fn start_splitting(&self) {
        self.write().state = UploadState::Splitting;
    }

    /// Marks the session as dispatching `total_chunks` chunks.
    pub fn start_dispatching(&self, total_chunks: usize) {
        let mut s = self.write();
        s.state = UploadState::Dispatching;
        s.total_chunks_to_process = total_chunks;
    }

    /// Adds a batch's chunk ids to the in-flight set.
    pub fn batch_started(&self, ids: &[ChunkId]) {
        let mut s = self.write();
        s.in_flight.extend(ids.iter().copied());
    }

    /// Removes a batch's chunk ids from the in-flight set.
    pub fn batch_finished(&self, ids: &[ChunkId]) {
        let mut s = self.write();
        for id in ids {
            s.in_flight.remove(id);
        }
    }

    /// Resets all counters once every batch has resolved.
    pub fn settle(&self) {
        let mut s = self.write();
        s.state = UploadState::Settled;
        s.total_chunks_to_process = 0;
        s.in_flight.clear();
        s.files.clear();
    }

    /// Returns to idle after the asset tree was rejected.
    pub fn reset(&self) {
        let mut s = self.write();
        s.state = UploadState::Idle;
        s.total_chunks_to_process = 0;
        s.in_flight.clear();
        s.files.clear();
        s.started_at = None;
    }

    pub fn id(&self) -> String {
        self.read().id.clone()
    }

    pub fn state(&self) -> UploadState {
        self.read().state
    }

    /// Returns `true` between asset submission and settlement.
    pub fn is_active(&self) -> bool {
        matches!(
            self.read().state,
            UploadState::AssetsSubmitted | UploadState::Splitting | UploadState::Dispatching
        )
    }

    pub fn total_chunks_to_process(&self) -> usize {
        self.read().total_chunks_to_process
    }

    /// Returns a copy of the chunk ids currently being transmitted.
    pub fn in_flight(&self) -> HashSet<ChunkId> {
        self.read().in_flight.clone()
    }

    pub fn in_flight_count(&self) -> usize {
        self.read().in_flight.len()
    }

    /// Returns `true` if any of a stored file's chunks is being transmitted.
    pub fn is_file_in_flight(&self, chunks: &[ChunkId]) -> bool {
        let s = self.read();
        chunks.iter().any(|id| s.in_flight.contains(id))
    }

    pub fn files(&self) -> Vec<SessionFile> {
        self.read().files.clone()
    }

    /// Time since the assets were submitted, if they were.
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.read().started_at.map(|t| t.elapsed())
    }

    pub fn progress(&self) -> UploadProgress {
        let s = self.read();
        UploadProgress {
            session_id: s.id.clone(),
            state: s.state,
            total_chunks_to_process: s.total_chunks_to_process,
            in_flight_chunks: s.in_flight.len(),
            file_count: s.files.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<u128>) -> Vec<ChunkId> {
        range.map(ChunkId).collect()
    }

    fn sample_files() -> Vec<SessionFile> {
        vec![
            SessionFile {
                label: "a.txt".into(),
                chunks: ids(0..1),
            },
            SessionFile {
                label: "docs/b.bin".into(),
                chunks: ids(1..3),
            },
        ]
    }

    #[test]
    fn new_session_is_idle() {
        let session = UploadSession::new("s1");
        assert_eq!(session.state(), UploadState::Idle);
        assert!(!session.is_active());
        assert_eq!(session.total_chunks_to_process(), 0);
        assert!(session.in_flight().is_empty());
        assert!(session.elapsed().is_none());
    }

    #[test]
    fn lifecycle_transitions() {
        let session = UploadSession::new("s1");
        session.assets_submitted(sample_files());
        assert_eq!(session.state(), UploadState::AssetsSubmitted);
        assert!(session.is_active());
        assert_eq!(session.files().len(), 2);

        session.start_splitting();
        assert_eq!(session.state(), UploadState::Splitting);

        session.start_dispatching(3);
        assert_eq!(session.state(), UploadState::Dispatching);
        assert_eq!(session.total_chunks_to_process(), 3);

        session.settle();
        assert_eq!(session.state(), UploadState::Settled);
        assert!(!session.is_active());
        assert_eq!(session.total_chunks_to_process(), 0);
        assert!(session.files().is_empty());
    }

    #[test]
    fn in_flight_tracks_whole_batches() {
        let session = UploadSession::new("s1");
        session.start_dispatching(4);
        session.batch_started(&ids(0..2));
        session.batch_started(&ids(2..4));
        assert_eq!(session.in_flight_count(), 4);

        session.batch_finished(&ids(2..4));
        assert_eq!(session.in_flight(), ids(0..2).into_iter().collect());
        assert!(session.is_file_in_flight(&[ChunkId(1), ChunkId(9)]));
        assert!(!session.is_file_in_flight(&[ChunkId(3)]));

        session.batch_finished(&ids(0..2));
        assert_eq!(session.in_flight_count(), 0);
    }

    #[test]
    fn reset_returns_to_idle() {
        let session = UploadSession::new("s1");
        session.assets_submitted(sample_files());
        session.reset();
        assert_eq!(session.state(), UploadState::Idle);
        assert!(session.files().is_empty());
        assert!(session.elapsed().is_none());
    }

    #[test]
    fn progress_snapshot() {
        let session = UploadSession::new("s1");
        session.assets_submitted(sample_files());
        session.start_dispatching(3);
        session.batch_started(&ids(0..3));

        let p = session.progress();
        assert_eq!(p.session_id, "s1");
        assert_eq!(p.state, UploadState::Dispatching);
        assert_eq!(p.total_chunks_to_process, 3);
        assert_eq!(p.in_flight_chunks, 3);
        assert_eq!(p.file_count, 2);

        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["state"], "dispatching");
    }

    #[test]
    fn concurrent_batches_do_not_lose_updates() {
        use std::sync::Arc;
        use std::thread;

        let session = Arc::new(UploadSession::new("s1"));
        session.start_dispatching(1000);

        let mut handles = vec![];
        for batch in 0..10u128 {
            let s = Arc::clone(&session);
            handles.push(thread::spawn(move || {
                let batch_ids = ids(batch * 100..(batch + 1) * 100);
                s.batch_started(&batch_ids);
                let _ = s.progress();
                s.batch_finished(&batch_ids);
            }));
        }
        // Readers interleaving with the writers.
        for _ in 0..5 {
            let s = Arc::clone(&session);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let _ = s.in_flight_count();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(session.in_flight_count(), 0);
        assert_eq!(session.total_chunks_to_process(), 1000);
    }
}
