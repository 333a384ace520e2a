//! Error types shared across the tagging library.

use std::path::PathBuf;

use thiserror::Error;

use crate::corpus::FetchError;

/// Errors returned by corpus acquisition, vocabulary construction,
/// suggestion, search, and front matter editing.
#[derive(Debug, Error)]
pub enum JTagError {
    /// A referenced post or corpus file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Suggestion or listing produced no tags.
    #[error("No tags found in input")]
    NoTagsFound,

    /// A search query matched nothing in the vocabulary.
    #[error("No results")]
    NoResults,

    /// No usable file argument or piped content was supplied.
    #[error("No valid filename in arguments")]
    NoValidFile,

    /// The tags file is neither YAML nor JSON, or lacks a `tags` key.
    #[error("Invalid tags file: {0}")]
    InvalidTagsFile(String),

    /// None of the requested tags are present on the post.
    #[error("No matching tags found in {0}")]
    NoMatchingTags(String),

    /// The remote corpus could not be fetched.
    #[error("Tags corpus unavailable: {0}")]
    CorpusUnavailable(#[from] FetchError),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization or deserialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The front matter block is not a YAML mapping.
    #[error("Invalid front matter: {0}")]
    InvalidFrontMatter(String),

    /// The configuration is missing a required value or is unusable.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl JTagError {
    /// Wraps an I/O error with the path it occurred on.
    ///
    /// A `NotFound` error becomes [`JTagError::FileNotFound`] so callers can
    /// match on the missing path directly.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Returns true for conditions caused by user input rather than by the
    /// environment (missing files, empty results).
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_)
                | Self::NoTagsFound
                | Self::NoResults
                | Self::NoValidFile
                | Self::NoMatchingTags(_)
        )
    }
}

/// Convenience alias used throughout the library.
pub type Result<T, E = JTagError> = std::result::Result<T, E>;
