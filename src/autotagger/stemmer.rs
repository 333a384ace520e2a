use std::sync::LazyLock;

use rust_stemmers::{Algorithm, Stemmer};

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

/// Reduces a word or phrase to its lower-cased root form.
///
/// Input is lower-cased first and every whitespace-delimited word is stemmed
/// on its own, so multi-word tags become a space-joined sequence of roots.
/// The same function builds vocabulary keys and normalizes words taken from
/// post text; the two must never diverge.
///
/// # Examples
///
/// ```
/// use jtag::autotagger::stem;
///
/// assert_eq!(stem("Running"), "run");
/// assert_eq!(stem("Productivity"), stem("productivity"));
/// assert_eq!(stem("Open  Source"), "open sourc");
/// ```
#[must_use]
pub fn stem(word: &str) -> String {
    word.to_lowercase()
        .split_whitespace()
        .map(|part| STEMMER.stem(part).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
