//! Periodic progress reporting for one upload session.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::{UploadProgress, UploadSession};

const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

/// Callback invoked with upload progress.
pub type ProgressCallback = Box<dyn Fn(UploadProgress) + Send + Sync>;

/// Reports a session's progress to callbacks while it is active.
///
/// Ticks only emit when the snapshot changed since the last emission, so a
/// stalled batch does not repeat the same line.
pub struct ProgressTracker {
    session: Arc<UploadSession>,
    callbacks: Arc<Mutex<Vec<ProgressCallback>>>,
    interval: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressTracker {
    /// Watches `session`, ticking every `interval` (250 ms when `None`).
    pub fn new(session: Arc<UploadSession>, interval: Option<Duration>) -> Self {
        Self {
            session,
            callbacks: Arc::new(Mutex::new(Vec::new())),
            interval: interval.unwrap_or(DEFAULT_INTERVAL),
            ticker: Mutex::new(None),
        }
    }

    pub fn on_progress(&self, callback: ProgressCallback) {
        lock(&self.callbacks).push(callback);
    }

    /// Emits the current snapshot regardless of state.
    pub fn notify(&self) {
        emit(&self.callbacks, self.session.progress());
    }

    /// Spawns the ticker on the current tokio runtime, replacing any
    /// previous one.
    pub fn start(&self) {
        let session = Arc::clone(&self.session);
        let callbacks = Arc::clone(&self.callbacks);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut last: Option<UploadProgress> = None;
            loop {
                ticker.tick().await;
                if !session.is_active() {
                    continue;
                }
                let progress = session.progress();
                if last.as_ref() != Some(&progress) {
                    emit(&callbacks, progress.clone());
                    last = Some(progress);
                }
            }
        });

        if let Some(previous) = lock(&self.ticker).replace(handle) {
            previous.abort();
        }
    }

    pub fn stop(&self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
            debug!(session = %self.session.id(), "progress ticker stopped");
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn emit(callbacks: &Mutex<Vec<ProgressCallback>>, progress: UploadProgress) {
    for cb in lock(callbacks).iter() {
        cb(progress.clone());
    }
}
