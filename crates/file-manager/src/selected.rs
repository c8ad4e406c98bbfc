//! Files chosen for upload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FileManagerError;

/// Where a selected file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileContent {
    Memory(Arc<[u8]>),
    Disk(PathBuf),
}

/// A file picked for upload. Immutable once selected.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Path relative to the selected folder, including the file name
    /// (`"photos/2024/a.png"`). Empty when the file was picked on its own.
    pub relative_path: String,
    pub size: u64,
    pub mime_type: String,
    content: FileContent,
}

impl SelectedFile {
    /// Creates a selection backed by in-memory bytes.
    pub fn from_bytes(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            content: FileContent::Memory(data),
        }
    }

    /// Creates a selection backed by a file on disk, read lazily.
    pub fn from_disk(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        relative_path: impl Into<String>,
        size: u64,
    ) -> Self {
        let name = name.into();
        let mime_type = detect_mime_type(&name).to_string();
        Self {
            name,
            relative_path: relative_path.into(),
            size,
            mime_type,
            content: FileContent::Disk(path.into()),
        }
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Reads the full content.
    pub async fn read_all(&self) -> Result<Vec<u8>, FileManagerError> {
        match &self.content {
            FileContent::Memory(data) => Ok(data.to_vec()),
            FileContent::Disk(path) => Ok(tokio::fs::read(path).await?),
        }
    }

    /// Text after the last `.` of the name, or the whole name without one.
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Relative path, or the bare name for flat selections.
    pub fn label(&self) -> &str {
        if self.relative_path.is_empty() {
            &self.name
        } else {
            &self.relative_path
        }
    }
}

/// Guesses a MIME type from a file name's extension.
pub fn detect_mime_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("txt" | "log") => "text/plain",
        Some("md") => "text/markdown",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}
