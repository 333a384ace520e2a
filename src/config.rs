//! Configuration and the support directory.
//!
//! Everything jtag reads at startup lives in one directory: `config.yml`
//! plus the blacklist, stopword, and synonym files. The directory is chosen
//! by the `--config-dir` flag, then `JTAG_CONFIG_DIR`, then the platform
//! config directory (`~/.config/jtag` on Linux).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JTagError, Result};
use crate::support::DEFAULT_STOPWORDS;
use crate::support::{BLACKLIST_FILE, STOPWORDS_FILE, SYNONYMS_FILE};
use crate::utils::{ensure_directory, expand_tilde, read_file, write_atomic};

/// File name of the configuration in the support directory.
pub const CONFIG_FILE: &str = "config.yml";

/// All files `jtag init` creates.
pub const SUPPORT_FILES: [&str; 4] = [CONFIG_FILE, BLACKLIST_FILE, STOPWORDS_FILE, SYNONYMS_FILE];

/// Environment variable overriding the support directory.
pub const CONFIG_DIR_ENV: &str = "JTAG_CONFIG_DIR";

/// Environment variable overriding `tags_location`.
pub const TAGS_LOCATION_ENV: &str = "JTAG_TAGS_LOCATION";

const DEFAULT_CONFIG: &str = "\
# Where to find the known tags: a local YAML/JSON file or a URL.
# The payload is {\"tags\": [...], \"tags_count\": [{\"name\": ..., \"count\": ...}]}
tags_location: localhost/data/tags.json
# How many times a word must appear before it becomes a suggestion
min_matches: 2
# Front matter key holding a post's tags
tags_key: tags
# Directory of posts used when no files are given
# default_post_location: ~/blog/_posts
post_extension: md
";

const DEFAULT_SYNONYMS: &str = "\
# Canonical tag names mapped to variant spellings, e.g.
# Mac:
#   - macintosh
#   - macos
";

/// Settings from `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local tags file or remote URL. Required for anything that needs the
    /// corpus.
    pub tags_location: Option<String>,
    /// Minimum occurrences for a word to be suggested.
    pub min_matches: usize,
    /// Front matter key holding tags.
    pub tags_key: String,
    /// Directory of posts used when no input is given.
    pub default_post_location: Option<String>,
    /// Extension of post files in `default_post_location`.
    pub post_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags_location: None,
            min_matches: crate::autotagger::DEFAULT_MIN_MATCHES,
            tags_key: "tags".to_string(),
            default_post_location: None,
            post_extension: "md".to_string(),
        }
    }
}

impl Config {
    /// Parses configuration YAML. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn parse(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Option<Self> = serde_yaml::from_str(yaml)?;
        Ok(config.unwrap_or_default())
    }

    /// Loads `config.yml` from `dir`, applying `JTAG_TAGS_LOCATION`.
    ///
    /// # Errors
    ///
    /// Returns [`JTagError::FileNotFound`] if the file is missing, or an
    /// error if it cannot be parsed.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut config = Self::parse(&read_file(&dir.join(CONFIG_FILE))?)?;

        if let Ok(location) = std::env::var(TAGS_LOCATION_ENV)
            && !location.trim().is_empty()
        {
            tracing::debug!(%location, "Using tags location from environment");
            config.tags_location = Some(location);
        }

        Ok(config)
    }

    /// Returns the configured tags location.
    ///
    /// # Errors
    ///
    /// Returns [`JTagError::Config`] if it is unset or blank.
    pub fn tags_location(&self) -> Result<&str> {
        self.tags_location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .ok_or_else(|| JTagError::Config("tags_location is not set in config.yml".to_string()))
    }

    /// Returns the default post directory with `~` expanded.
    pub fn default_post_location(&self) -> Option<PathBuf> {
        self.default_post_location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(expand_tilde)
    }
}

/// Resolves the support directory.
///
/// # Errors
///
/// Returns [`JTagError::Config`] if no flag or environment variable is set
/// and the platform has no config directory.
pub fn resolve_support_dir(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }

    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(expand_tilde(dir.trim()));
    }

    dirs::config_dir()
        .map(|dir| dir.join("jtag"))
        .ok_or_else(|| JTagError::Config("failed to determine config directory".to_string()))
}

/// Returns true if every support file exists in `dir`.
pub fn config_files_complete(dir: &Path) -> bool {
    SUPPORT_FILES.iter().all(|file| dir.join(file).is_file())
}

/// Writes the default support files into `dir`.
///
/// Existing files are left alone unless `force` is set. Returns the paths
/// that were written.
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn init(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    ensure_directory(dir)?;

    let defaults = [
        (CONFIG_FILE, DEFAULT_CONFIG),
        (BLACKLIST_FILE, ""),
        (STOPWORDS_FILE, DEFAULT_STOPWORDS),
        (SYNONYMS_FILE, DEFAULT_SYNONYMS),
    ];

    let mut written = Vec::new();
    for (name, contents) in defaults {
        let path = dir.join(name);
        if path.exists() && !force {
            continue;
        }
        write_atomic(&path, contents)?;
        tracing::info!(path = %path.display(), "Wrote support file");
        written.push(path);
    }

    Ok(written)
}
