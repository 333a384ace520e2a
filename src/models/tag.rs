use serde::{Deserialize, Serialize};

/// A known tag from the corpus.
///
/// `name` is the canonical display string (e.g. `"Productivity"`); `count`
/// is how many posts use it, or 0 when the corpus does not say.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    name: String,
    #[serde(default)]
    count: u64,
}

impl Tag {
    /// Creates a tag with an unknown usage count.
    ///
    /// # Examples
    ///
    /// ```
    /// use jtag::Tag;
    ///
    /// let tag = Tag::new("Productivity");
    /// assert_eq!(tag.name(), "Productivity");
    /// assert_eq!(tag.count(), 0);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_count(name, 0)
    }

    /// Creates a tag with a known usage count.
    pub fn with_count(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }

    /// Returns the canonical display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the usage count.
    pub fn count(&self) -> u64 {
        self.count
    }
}
