//! Free-text search over the known tag vocabulary.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::error::{JTagError, Result};
use crate::models::Tag;

use super::stemmer::stem;
use super::vocabulary::Vocabulary;

/// How a search query is compared with tag names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// The tag name contains the query.
    #[default]
    Contains,
    /// The tag name starts with the query.
    StartsWith,
    /// The tag name equals the query.
    Exact,
    /// The query's characters appear in the tag name in order.
    Fuzzy,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contains" | "c" => Ok(Self::Contains),
            "starts-with" | "starts_with" | "start" | "s" => Ok(Self::StartsWith),
            "exact" | "e" => Ok(Self::Exact),
            "fuzzy" | "f" => Ok(Self::Fuzzy),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
            Self::Exact => "exact",
            Self::Fuzzy => "fuzzy",
        };
        f.write_str(name)
    }
}

/// Finds vocabulary tags matching `query`.
///
/// Comparison ignores case unless `case_sensitive` is set. A query whose
/// stem is a vocabulary key also matches that key's tag. Fuzzy results are
/// ordered best match first; other modes keep vocabulary order.
///
/// # Errors
///
/// Returns [`JTagError::NoResults`] if nothing matches.
///
/// # Examples
///
/// ```
/// use jtag::autotagger::{search_tags, SearchMode, Vocabulary};
/// use jtag::support::{Blacklist, Synonyms};
/// use jtag::Tag;
///
/// let corpus = vec![Tag::new("productivity"), Tag::new("conference")];
/// let vocabulary = Vocabulary::build(&corpus, &Blacklist::default(), &Synonyms::default());
///
/// let found = search_tags(&vocabulary, "product", SearchMode::Contains, false).unwrap();
/// assert_eq!(found[0].name(), "productivity");
/// ```
pub fn search_tags<'v>(
    vocabulary: &'v Vocabulary,
    query: &str,
    mode: SearchMode,
    case_sensitive: bool,
) -> Result<Vec<&'v Tag>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(JTagError::NoResults);
    }

    let fold = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let needle = fold(query);

    let mut results: Vec<&Tag> = match mode {
        SearchMode::Fuzzy => {
            let matcher = if case_sensitive {
                SkimMatcherV2::default().respect_case()
            } else {
                SkimMatcherV2::default().ignore_case()
            };
            let mut scored: Vec<(i64, &Tag)> = vocabulary
                .tags()
                .into_iter()
                .filter_map(|tag| matcher.fuzzy_match(tag.name(), query).map(|score| (score, tag)))
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name().cmp(b.1.name())));
            scored.into_iter().map(|(_, tag)| tag).collect()
        }
        _ => vocabulary
            .tags()
            .into_iter()
            .filter(|tag| {
                let name = fold(tag.name());
                match mode {
                    SearchMode::Contains => name.contains(&needle),
                    SearchMode::StartsWith => name.starts_with(&needle),
                    _ => name == needle,
                }
            })
            .collect(),
    };

    if !case_sensitive
        && let Some(tag) = vocabulary.lookup_by_stem(&stem(query))
    {
        results.push(tag);
    }

    let mut seen = HashSet::new();
    results.retain(|tag| seen.insert(tag.name()));

    if results.is_empty() {
        return Err(JTagError::NoResults);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::{Blacklist, Synonyms};

    fn vocabulary() -> Vocabulary {
        let corpus: Vec<Tag> = ["productivity", "conference", "Product Design", "writing"]
            .into_iter()
            .map(Tag::new)
            .collect();
        Vocabulary::build(&corpus, &Blacklist::default(), &Synonyms::default())
    }

    fn names(tags: &[&Tag]) -> Vec<String> {
        tags.iter().map(|tag| tag.name().to_string()).collect()
    }

    #[test]
    fn contains_is_default_and_case_insensitive() {
        let vocabulary = vocabulary();

        let found = search_tags(&vocabulary, "PRODUCT", SearchMode::default(), false).unwrap();

        assert_eq!(names(&found), vec!["productivity", "Product Design"]);
    }

    #[test]
    fn case_sensitive_search_can_miss() {
        let vocabulary = vocabulary();

        let result = search_tags(&vocabulary, "Productivity", SearchMode::Contains, true);

        assert!(matches!(result, Err(JTagError::NoResults)));
    }

    #[test]
    fn starts_with_and_exact_modes() {
        let vocabulary = vocabulary();

        let starts = search_tags(&vocabulary, "conf", SearchMode::StartsWith, false).unwrap();
        assert_eq!(names(&starts), vec!["conference"]);

        let exact = search_tags(&vocabulary, "writing", SearchMode::Exact, false).unwrap();
        assert_eq!(names(&exact), vec!["writing"]);
    }

    #[test]
    fn fuzzy_matches_ordered_characters() {
        let vocabulary = vocabulary();

        let found = search_tags(&vocabulary, "rn", SearchMode::Fuzzy, false).unwrap();

        assert!(names(&found).contains(&"conference".to_string()));
    }

    #[test]
    fn stemmed_query_matches_vocabulary_key() {
        let vocabulary = vocabulary();

        let found = search_tags(&vocabulary, "writes", SearchMode::Exact, false).unwrap();

        assert_eq!(names(&found), vec!["writing"]);
    }

    #[test]
    fn empty_query_has_no_results() {
        let vocabulary = vocabulary();

        assert!(search_tags(&vocabulary, "  ", SearchMode::Contains, false).is_err());
    }

    #[test]
    fn modes_parse_from_strings() {
        assert_eq!("fuzzy".parse::<SearchMode>(), Ok(SearchMode::Fuzzy));
        assert_eq!("starts-with".parse::<SearchMode>(), Ok(SearchMode::StartsWith));
        assert_eq!("E".parse::<SearchMode>(), Ok(SearchMode::Exact));
        assert!("nearby".parse::<SearchMode>().is_err());
    }
}
