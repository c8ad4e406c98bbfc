//! Local file selection.
//!
//! Turns paths given on the command line into [`SelectedFile`]s the way a
//! browser file picker would: plain files get no relative path, files found
//! inside a selected directory get a `/`-separated path rooted at that
//! directory's own name.

use std::path::Path;

use crate::error::FileManagerError;
use crate::selected::SelectedFile;

/// Builds a selection from files and directories.
///
/// Directories are walked recursively with entries sorted by name. Each
/// selected path is resolved first, so `.` or `dir/..` are named after the
/// directory they point to.
pub fn scan_selection(paths: &[impl AsRef<Path>]) -> Result<Vec<SelectedFile>, FileManagerError> {
    let mut files = Vec::new();

    for path in paths {
        let path = std::fs::canonicalize(path.as_ref())?;
        let metadata = std::fs::metadata(&path)?;
        let name = file_name(&path)?;

        if metadata.is_dir() {
            walk_dir(&path, &name, &mut files)?;
        } else if metadata.is_file() {
            files.push(SelectedFile::from_disk(&path, name, "", metadata.len()));
        }
    }

    Ok(files)
}

fn walk_dir(
    current: &Path,
    prefix: &str,
    files: &mut Vec<SelectedFile>,
) -> Result<(), FileManagerError> {
    let mut entries = std::fs::read_dir(current)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let metadata = entry.metadata()?;
        let name = file_name(&path)?;
        let relative = format!("{prefix}/{name}");

        if metadata.is_dir() {
            walk_dir(&path, &relative, files)?;
        } else if metadata.is_file() {
            files.push(SelectedFile::from_disk(&path, name, relative, metadata.len()));
        }
    }

    Ok(())
}

fn file_name(path: &Path) -> Result<String, FileManagerError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FileManagerError::InvalidName(path.display().to_string()))
}
