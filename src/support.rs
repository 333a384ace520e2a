//! Support files kept alongside the configuration: the tag blacklist, the
//! stopword list, and the synonym table.

mod blacklist;
mod stopwords;
mod synonyms;

pub use blacklist::Blacklist;
pub use stopwords::StopWords;
pub use synonyms::Synonyms;

pub(crate) use stopwords::DEFAULT_STOPWORDS;

/// File name of the blacklist in the support directory.
pub const BLACKLIST_FILE: &str = "blacklist.txt";
/// File name of the stopword list in the support directory.
pub const STOPWORDS_FILE: &str = "stopwords.txt";
/// File name of the synonym table in the support directory.
pub const SYNONYMS_FILE: &str = "synonyms.yml";
