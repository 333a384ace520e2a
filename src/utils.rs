//! Shared filesystem helpers for the CLI and the library.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{JTagError, Result};

/// Reads a file to a string, mapping failures to [`JTagError`].
///
/// # Errors
///
/// Returns [`JTagError::FileNotFound`] if the file does not exist, or
/// [`JTagError::Io`] for other read failures.
pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| JTagError::io(path, e))
}

/// Replaces `path` with `contents` in one step.
///
/// The data is written to a temporary file in the same directory and then
/// renamed over the target, so readers never see a partial file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written, or
/// renamed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| JTagError::io(dir, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| JTagError::io(temp.path(), e))?;
    temp.persist(path).map_err(|e| JTagError::io(path, e.error))?;

    Ok(())
}

/// Ensures `dir` exists, creating it and its parents if needed.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_directory(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| JTagError::io(dir, e))
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Splits text into trimmed, non-empty lines.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
