//! Known-tag corpus acquisition.
//!
//! A corpus comes from one of three places: a local YAML or JSON tags file,
//! the front matter of a set of posts, or a remote endpoint serving the same
//! payload as the tags file:
//!
//! ```json
//! { "tags": ["tag1", "tag2"],
//!   "tags_count": [{"name": "tag1", "count": 3}] }
//! ```

pub mod client;

pub use client::{CorpusClient, CorpusClientBuilder, FetchError, TagsFetcher};

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{JTagError, Result};
use crate::models::{Post, Tag};
use crate::support::Blacklist;
use crate::utils::{expand_tilde, read_file};

/// Where the corpus is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    /// A local tags file.
    File(PathBuf),
    /// Posts whose existing tags make up the corpus.
    Posts(Vec<PathBuf>),
    /// A URL, with or without a scheme.
    Remote(String),
}

impl CorpusSource {
    /// Chooses a source for a configured tags location.
    ///
    /// An existing local path is a [`CorpusSource::File`]; anything else is
    /// treated as a [`CorpusSource::Remote`] URL.
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        let path = expand_tilde(location);
        if path.is_file() {
            Self::File(path)
        } else {
            Self::Remote(location.to_string())
        }
    }
}

/// Options controlling which tags an acquisition returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOptions {
    /// Keep blacklisted tags in the result.
    pub blacklisted: bool,
    /// The caller wants usage counts displayed.
    pub counts: bool,
}

/// Reads the corpus from `source`.
///
/// Unless `options.blacklisted` is set, tags on `blacklist` are dropped.
///
/// # Errors
///
/// Returns [`JTagError::FileNotFound`] for a missing tags file or post,
/// [`JTagError::CorpusUnavailable`] when a remote fetch fails, and
/// [`JTagError::InvalidTagsFile`] when the payload has no usable `tags` list.
pub fn acquire(
    source: &CorpusSource,
    fetcher: &dyn TagsFetcher,
    tags_key: &str,
    blacklist: &Blacklist,
    options: TagOptions,
) -> Result<Vec<Tag>> {
    let mut tags = match source {
        CorpusSource::File(path) => {
            tracing::debug!(path = %path.display(), "Reading tags file");
            parse_tags_payload(&read_file(path)?, &path.display().to_string())?
        }
        CorpusSource::Posts(paths) => {
            tracing::debug!(posts = paths.len(), "Scanning posts for tags");
            scan_posts(paths, tags_key)?
        }
        CorpusSource::Remote(url) => {
            tracing::debug!(%url, "Fetching remote tags");
            parse_tags_payload(&fetcher.fetch(url)?, url)?
        }
    };

    if !options.blacklisted {
        tags.retain(|tag| !blacklist.contains(tag.name()));
    }
    Ok(tags)
}

/// Parses a tags payload, trying YAML first and JSON second.
///
/// Null and empty entries in `tags` are dropped. Counts are taken from
/// `tags_count` when present and default to 0.
///
/// # Errors
///
/// Returns [`JTagError::InvalidTagsFile`] naming `origin` when the text is
/// neither YAML nor JSON or has no `tags` sequence.
///
/// # Examples
///
/// ```
/// use jtag::corpus::parse_tags_payload;
///
/// let tags = parse_tags_payload(
///     r#"{"tags": ["mac", null], "tags_count": [{"name": "mac", "count": 3}]}"#,
///     "tags.json",
/// ).unwrap();
/// assert_eq!(tags.len(), 1);
/// assert_eq!(tags[0].count(), 3);
/// ```
pub fn parse_tags_payload(text: &str, origin: &str) -> Result<Vec<Tag>> {
    let value = match serde_yaml::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => serde_json::from_str::<serde_json::Value>(text)
            .ok()
            .and_then(|json| serde_yaml::to_value(json).ok())
            .ok_or_else(|| JTagError::InvalidTagsFile(origin.to_string()))?,
    };

    let Some(Value::Sequence(names)) = value.get("tags") else {
        return Err(JTagError::InvalidTagsFile(origin.to_string()));
    };

    let counts: HashMap<String, u64> = match value.get("tags_count") {
        Some(Value::Sequence(entries)) => entries
            .iter()
            .filter_map(|entry| serde_yaml::from_value::<Tag>(entry.clone()).ok())
            .map(|tag| (tag.name().to_string(), tag.count()))
            .collect(),
        _ => HashMap::new(),
    };

    Ok(names
        .iter()
        .filter_map(|name| match name {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|name| !name.is_empty())
        .map(|name| {
            let count = counts.get(&name).copied().unwrap_or_default();
            Tag::with_count(name, count)
        })
        .collect())
}

/// Builds a corpus from the tags already present on `paths`.
///
/// Each tag's count is the number of posts carrying it. The result is sorted
/// by name, ignoring case.
///
/// # Errors
///
/// Returns an error if a post cannot be read.
pub fn scan_posts(paths: &[PathBuf], tags_key: &str) -> Result<Vec<Tag>> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for path in paths {
        let post = Post::parse_lenient(&read_file(path)?);
        let unique: HashSet<String> = post.tags(tags_key).into_iter().collect();
        for tag in unique {
            *counts.entry(tag).or_default() += 1;
        }
    }

    let mut tags: Vec<Tag> = counts
        .into_iter()
        .map(|(name, count)| Tag::with_count(name, count))
        .collect();
    tags.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
    });
    Ok(tags)
}

/// Lists the posts in `dir` with the given extension, sorted by path.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn collect_posts(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let entries = fs::read_dir(dir).map_err(|e| JTagError::io(dir, e))?;

    let mut posts = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| JTagError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            posts.push(path);
        }
    }
    posts.sort();
    Ok(posts)
}
