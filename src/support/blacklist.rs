use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::{non_empty_lines, read_file, write_atomic};

/// Tags that are never suggested or listed.
///
/// Entries are lower-cased and kept sorted and deduplicated. Edits change
/// only this set and its file; a [`crate::autotagger::Vocabulary`] that was
/// already built is not affected.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    path: Option<PathBuf>,
    entries: BTreeSet<String>,
}

impl Blacklist {
    /// Creates an in-memory blacklist that is not backed by a file.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            path: None,
            entries: entries
                .into_iter()
                .map(|entry| entry.as_ref().trim().to_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    /// Loads a blacklist from a one-entry-per-line file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::JTagError::FileNotFound`] if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_file(path)?;
        let mut blacklist = Self::from_entries(non_empty_lines(&contents));
        blacklist.path = Some(path.to_path_buf());
        Ok(blacklist)
    }

    /// Returns true if `tag` is blacklisted, ignoring case.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains(&tag.to_lowercase())
    }

    /// Iterates over entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is blacklisted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds `tags` and persists the result. Returns the entries that were new.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    pub fn add<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<Vec<String>> {
        let added = tags
            .iter()
            .map(|tag| tag.as_ref().trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .filter(|tag| self.entries.insert(tag.clone()))
            .collect();
        self.save()?;
        Ok(added)
    }

    /// Removes `tags` and persists the result. Returns the entries that were
    /// actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    pub fn remove<S: AsRef<str>>(&mut self, tags: &[S]) -> Result<Vec<String>> {
        let removed = tags
            .iter()
            .map(|tag| tag.as_ref().trim().to_lowercase())
            .filter(|tag| self.entries.remove(tag))
            .collect();
        self.save()?;
        Ok(removed)
    }

    /// Writes the entries back to the backing file, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut contents = self.entries.iter().cloned().collect::<Vec<_>>().join("\n");
        contents.push('\n');
        write_atomic(path, &contents)?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "Saved blacklist");
        Ok(())
    }
}
