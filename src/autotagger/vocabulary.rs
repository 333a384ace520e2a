use std::collections::{HashMap, HashSet};

use crate::models::Tag;
use crate::support::{Blacklist, Synonyms};

use super::stemmer::stem;

/// Known tags keyed by their stem.
///
/// Built once per run from the corpus, blacklist, and synonym table; the
/// mapping is never edited afterwards.
///
/// # Duplicate keys
///
/// Distinct tags can share a stem ("Writing" and "Writes"), and a synonym
/// key can collide with a corpus stem. The later insertion wins: corpus tags
/// in corpus order, then synonyms in file order. An overwritten key keeps
/// the iteration position of its first insertion.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<(String, Tag)>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds the stem-to-tag mapping.
    ///
    /// Corpus tags whose lower-cased name is blacklisted are skipped. Each
    /// synonym then maps its lower-cased variant to the canonical tag,
    /// unless the variant or the canonical name is blacklisted.
    ///
    /// # Examples
    ///
    /// ```
    /// use jtag::autotagger::{Vocabulary, stem};
    /// use jtag::support::{Blacklist, Synonyms};
    /// use jtag::Tag;
    ///
    /// let corpus = vec![Tag::new("Productivity"), Tag::new("Conference")];
    /// let blacklist = Blacklist::from_entries(["conference"]);
    /// let vocabulary = Vocabulary::build(&corpus, &blacklist, &Synonyms::default());
    ///
    /// let found = vocabulary.lookup_by_stem(&stem("productivity"));
    /// assert_eq!(found.map(|t| t.name()), Some("Productivity"));
    /// assert!(!vocabulary.contains_stem(&stem("conference")));
    /// ```
    pub fn build(corpus: &[Tag], blacklist: &Blacklist, synonyms: &Synonyms) -> Self {
        let mut vocabulary = Self::default();

        for tag in corpus {
            if blacklist.contains(tag.name()) {
                continue;
            }
            vocabulary.insert(stem(tag.name()), tag.clone());
        }

        for (variant, canonical) in synonyms.iter() {
            let key = variant.trim().to_lowercase();
            if blacklist.contains(&key) || blacklist.contains(canonical) {
                continue;
            }
            vocabulary.insert(key, Tag::new(canonical));
        }

        tracing::debug!(
            corpus = corpus.len(),
            synonyms = synonyms.len(),
            entries = vocabulary.len(),
            "Built tag vocabulary"
        );
        vocabulary
    }

    fn insert(&mut self, key: String, tag: Tag) {
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = tag,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, tag));
            }
        }
    }

    /// Returns the tag for `stem`, if known.
    pub fn lookup_by_stem(&self, stem: &str) -> Option<&Tag> {
        self.index.get(stem).map(|&position| &self.entries[position].1)
    }

    /// Returns true if `stem` is a known key.
    pub fn contains_stem(&self, stem: &str) -> bool {
        self.index.contains_key(stem)
    }

    /// Iterates over `(stem, tag)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(key, tag)| (key.as_str(), tag))
    }

    /// Returns each distinct tag once, in insertion order.
    pub fn tags(&self) -> Vec<&Tag> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|(_, tag)| tag)
            .filter(|tag| seen.insert(tag.name()))
            .collect()
    }

    /// Number of stem keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
