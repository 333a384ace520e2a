use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::error::{JTagError, Result};
use crate::frontmatter;

/// Front matter delimiter: a line of exactly three dots or dashes.
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[.-]{3}[ \t]*\r?$").expect("separator pattern is valid"));

/// A blog post split into its front matter mapping and body text.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    metadata: Mapping,
    body: String,
}

impl Post {
    /// Creates a post from already-parsed parts.
    pub fn new(metadata: Mapping, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
        }
    }

    /// Splits `input` into front matter and body.
    ///
    /// Input without a leading front matter block is all body with empty
    /// metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter block is not a YAML mapping.
    ///
    /// # Examples
    ///
    /// ```
    /// use jtag::Post;
    ///
    /// let post = Post::parse("---\ntitle: Hello\ntags: [rust]\n---\nBody text\n").unwrap();
    /// assert_eq!(post.title().as_deref(), Some("Hello"));
    /// assert_eq!(post.tags("tags"), vec!["rust"]);
    /// assert_eq!(post.body(), "Body text\n");
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let Some((front, body)) = split_front_matter(input) else {
            return Ok(Self::new(Mapping::new(), input));
        };

        let metadata = match serde_yaml::from_str::<Value>(front)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            other => {
                return Err(JTagError::InvalidFrontMatter(format!(
                    "expected a mapping, found {}",
                    value_kind(&other)
                )));
            }
        };

        Ok(Self::new(metadata, body))
    }

    /// Parses `input`, treating the whole input as body when the front
    /// matter is malformed.
    pub fn parse_lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed front matter: {e}");
            Self::new(Mapping::new(), input)
        })
    }

    /// Returns the front matter mapping.
    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    /// Replaces the front matter mapping.
    pub fn set_metadata(&mut self, metadata: Mapping) {
        self.metadata = metadata;
    }

    /// Returns the body text following the front matter.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the post title, if the front matter has one.
    pub fn title(&self) -> Option<String> {
        match self.metadata.get("title")? {
            Value::String(title) => Some(title.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Returns the tags stored under `tags_key`.
    pub fn tags(&self, tags_key: &str) -> Vec<String> {
        frontmatter::read_tags(&self.metadata, tags_key)
    }

    /// Serializes the post back to text: front matter, a `---` line, body.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be serialized as YAML.
    pub fn render(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(&self.metadata)?;
        Ok(format!("---\n{yaml}---\n{}", self.body))
    }
}

/// Returns the front matter text and the body, or `None` when the input does
/// not open with a delimited block.
fn split_front_matter(input: &str) -> Option<(&str, &str)> {
    let mut separators = SEPARATOR.find_iter(input);
    let open = separators.next()?;
    if !input[..open.start()].trim().is_empty() {
        return None;
    }
    let close = separators.next()?;

    let front = &input[open.end()..close.start()];
    let rest = &input[close.end()..];
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    Some((front, body))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
