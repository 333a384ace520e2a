//! Tag suggestion from post text.
//!
//! The pipeline runs leaves first:
//!
//! 1. [`TextNormalizer`] strips HTML, Markdown/Liquid syntax, and URLs.
//! 2. [`stem`] reduces words (and tag names) to lower-cased roots.
//! 3. [`Vocabulary`] maps stems of known tags and synonym variants to
//!    canonical [`Tag`](crate::Tag)s, minus the blacklist.
//! 4. [`Suggester`] counts stemmed words, keeps those that occur at least
//!    `min_matches` times, and resolves them through the vocabulary.
//!
//! # Examples
//!
//! ```
//! use jtag::autotagger::{Suggester, Vocabulary};
//! use jtag::support::{Blacklist, StopWords, Synonyms};
//! use jtag::Tag;
//!
//! let corpus = vec![Tag::new("Productivity"), Tag::new("Conference")];
//! let blacklist = Blacklist::default();
//! let vocabulary = Vocabulary::build(&corpus, &blacklist, &Synonyms::default());
//! let stopwords = StopWords::default();
//!
//! let suggester = Suggester::new(&vocabulary, &stopwords)
//!     .blacklist(&blacklist)
//!     .min_matches(2);
//! let tags = suggester.suggest(
//!     "productivity productivity conference conference",
//!     &["existing".to_string()],
//! );
//! assert_eq!(tags, vec!["Conference", "Productivity", "existing"]);
//! ```
//!
//! [`search_tags`] answers free-text queries against the same vocabulary.

mod normalizer;
mod search;
mod stemmer;
mod suggester;
mod vocabulary;

pub use normalizer::TextNormalizer;
pub use search::{SearchMode, search_tags};
pub use stemmer::stem;
pub use suggester::{DEFAULT_MIN_MATCHES, Suggester};
pub use vocabulary::Vocabulary;
