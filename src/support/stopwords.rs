use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::utils::{non_empty_lines, read_file};

/// Default English stopword list written by `jtag init`.
pub(crate) const DEFAULT_STOPWORDS: &str = include_str!("default_stopwords.txt");

/// Lower-cased words ignored by frequency analysis.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Builds a stopword set from any list of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    /// Loads stopwords from a one-word-per-line file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::JTagError::FileNotFound`] if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_file(path)?;
        Ok(Self::from_words(non_empty_lines(&contents)))
    }

    /// Returns true if `word` is a stopword, ignoring case.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// Number of stopwords.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case() {
        let stopwords = StopWords::from_words(["The", "about", ""]);

        assert!(stopwords.contains("the"));
        assert!(stopwords.contains("ABOUT"));
        assert_eq!(stopwords.len(), 2);
    }

    #[test]
    fn default_list_is_populated() {
        let stopwords = StopWords::from_words(non_empty_lines(DEFAULT_STOPWORDS));

        assert!(stopwords.contains("because"));
        assert!(stopwords.contains("which"));
        assert!(!stopwords.contains("productivity"));
    }
}
