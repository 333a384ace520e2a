//! Frequency-based tag suggestion.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::support::{Blacklist, StopWords};

use super::normalizer::TextNormalizer;
use super::stemmer::stem;
use super::vocabulary::Vocabulary;

/// Default number of occurrences a word needs before it is considered.
pub const DEFAULT_MIN_MATCHES: usize = 2;

/// Words shorter than this are never counted.
const MIN_WORD_LENGTH: usize = 4;

/// Suggests tags for post text by matching word stems against a
/// [`Vocabulary`].
///
/// # Examples
///
/// ```
/// use jtag::autotagger::{Suggester, Vocabulary};
/// use jtag::support::{Blacklist, StopWords, Synonyms};
/// use jtag::Tag;
///
/// let corpus = vec![Tag::new("Productivity"), Tag::new("Conference")];
/// let vocabulary = Vocabulary::build(&corpus, &Blacklist::default(), &Synonyms::default());
/// let stopwords = StopWords::default();
///
/// let suggester = Suggester::new(&vocabulary, &stopwords).min_matches(2);
/// let tags = suggester.suggest("Productivity tips: productivity at the conference.", &[]);
/// assert_eq!(tags, vec!["Productivity"]);
/// ```
pub struct Suggester<'a> {
    vocabulary: &'a Vocabulary,
    stopwords: &'a StopWords,
    blacklist: Option<&'a Blacklist>,
    min_matches: usize,
}

impl<'a> Suggester<'a> {
    /// Creates a suggester with the default match threshold and no blacklist.
    pub fn new(vocabulary: &'a Vocabulary, stopwords: &'a StopWords) -> Self {
        Self {
            vocabulary,
            stopwords,
            blacklist: None,
            min_matches: DEFAULT_MIN_MATCHES,
        }
    }

    /// Sets how many times a word must occur to produce a suggestion.
    ///
    /// A threshold of 0 is treated as 1.
    #[must_use]
    pub fn min_matches(mut self, min_matches: usize) -> Self {
        self.min_matches = min_matches.max(1);
        self
    }

    /// Rejects resolved tags found on `blacklist`.
    #[must_use]
    pub fn blacklist(mut self, blacklist: &'a Blacklist) -> Self {
        self.blacklist = Some(blacklist);
        self
    }

    /// Returns suggested tags for `post_text` followed by `existing_tags`.
    ///
    /// Suggestions come first, ranked by word frequency (most frequent
    /// first, ties broken alphabetically by stem), then vocabulary entries
    /// that occur literally in the text often enough, then the existing
    /// tags. Duplicates keep their first position. When no word reaches the
    /// threshold, only the existing tags are returned.
    pub fn suggest(&self, post_text: &str, existing_tags: &[String]) -> Vec<String> {
        let content = TextNormalizer::normalize(post_text);
        let mut suggestions = Vec::new();

        let ranked = self.ranked_stems(&content);
        if !ranked.is_empty() {
            for (word, _) in &ranked {
                if let Some(tag) = self.vocabulary.lookup_by_stem(word)
                    && !self.is_blacklisted(tag.name())
                {
                    suggestions.push(tag.name().to_string());
                }
            }

            let haystack = content.to_lowercase();
            for (key, tag) in self.vocabulary.iter() {
                if count_whole_words(&haystack, key) >= self.min_matches
                    && !self.is_blacklisted(tag.name())
                {
                    suggestions.push(tag.name().to_string());
                }
            }
        }

        suggestions.extend(existing_tags.iter().cloned());

        let mut seen = HashSet::new();
        suggestions.retain(|tag| seen.insert(tag.clone()));
        suggestions
    }

    /// Tokenizes and stems `content`, dropping short, numeric, and stop words.
    ///
    /// A stopword survives when its stem is also a vocabulary key.
    pub fn split_words(&self, content: &str) -> Vec<String> {
        content
            .split(|c: char| c.is_whitespace() || c == '/' || c == '\\')
            .map(|token| {
                token
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                    .collect::<String>()
            })
            .filter(|token| {
                token.len() >= MIN_WORD_LENGTH && token.chars().any(|c| c.is_ascii_alphabetic())
            })
            .filter_map(|token| {
                let root = stem(&token);
                let is_stopword =
                    self.stopwords.contains(&root) || self.stopwords.contains(&token);
                (!is_stopword || self.vocabulary.contains_stem(&root)).then_some(root)
            })
            .collect()
    }

    /// Counts stems, keeps those meeting the threshold, and orders them by
    /// descending count then ascending stem.
    fn ranked_stems(&self, content: &str) -> Vec<(String, usize)> {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        for word in self.split_words(content) {
            *frequencies.entry(word).or_default() += 1;
        }

        let mut ranked: Vec<(String, usize)> = frequencies
            .into_iter()
            .filter(|(_, count)| *count >= self.min_matches)
            .collect();
        ranked.sort_by(|(a, a_count), (b, b_count)| {
            (Reverse(a_count), a).cmp(&(Reverse(b_count), b))
        });
        ranked
    }

    fn is_blacklisted(&self, tag: &str) -> bool {
        self.blacklist.is_some_and(|blacklist| blacklist.contains(tag))
    }
}

/// Counts non-overlapping occurrences of `needle` in `haystack` that start
/// and end on word boundaries. Both arguments must already be lower-cased.
fn count_whole_words(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }

    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let boundary_at = |index: usize| {
        let before = haystack[..index].chars().next_back();
        let after = haystack[index..].chars().next();
        is_word(before) != is_word(after)
    };

    let mut count = 0;
    let mut position = 0;
    while let Some(offset) = haystack[position..].find(needle) {
        let start = position + offset;
        let end = start + needle.len();
        if boundary_at(start) && boundary_at(end) {
            count += 1;
            position = end;
        } else {
            position = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    count
}
