use std::path::Path;

use serde_yaml::Value;

use crate::error::{JTagError, Result};
use crate::utils::read_file;

/// Variant spellings mapped to canonical tag names.
///
/// The file maps each canonical tag to a list of variants:
///
/// ```yaml
/// Mac:
///   - macintosh
///   - macos
/// ```
///
/// It is flattened to `(variant, canonical)` pairs in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Synonyms {
    pairs: Vec<(String, String)>,
}

impl Synonyms {
    /// Builds a table from `(variant, canonical)` pairs.
    pub fn from_pairs<I, V, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (V, C)>,
        V: Into<String>,
        C: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(variant, canonical)| (variant.into(), canonical.into()))
                .collect(),
        }
    }

    /// Parses the canonical-to-variants YAML structure.
    ///
    /// A canonical entry may list its variants as a sequence or give a
    /// single scalar. An empty document is an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not YAML or not a mapping.
    pub fn parse(yaml: &str) -> Result<Self> {
        let mapping = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(Self::default()),
            _ => {
                return Err(JTagError::Config(
                    "synonyms must map canonical tags to lists of variants".to_string(),
                ));
            }
        };

        let mut pairs = Vec::new();
        for (canonical, variants) in &mapping {
            let Some(canonical) = scalar(canonical) else {
                continue;
            };
            match variants {
                Value::Sequence(items) => {
                    for variant in items.iter().filter_map(scalar) {
                        pairs.push((variant, canonical.clone()));
                    }
                }
                other => {
                    if let Some(variant) = scalar(other) {
                        pairs.push((variant, canonical.clone()));
                    }
                }
            }
        }

        Ok(Self { pairs })
    }

    /// Loads the synonym table, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::parse(&read_file(path)?)
    }

    /// Iterates over `(variant, canonical)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(variant, canonical)| (variant.as_str(), canonical.as_str()))
    }

    /// Number of variant entries.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no synonyms.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_canonical_to_variants() {
        let synonyms = Synonyms::parse("Mac:\n  - macintosh\n  - macos\niOS: iphone os\n").unwrap();

        assert_eq!(
            synonyms.iter().collect::<Vec<_>>(),
            vec![
                ("macintosh", "Mac"),
                ("macos", "Mac"),
                ("iphone os", "iOS"),
            ]
        );
    }

    #[test]
    fn empty_document_is_empty_table() {
        assert!(Synonyms::parse("").unwrap().is_empty());
    }

    #[test]
    fn non_mapping_is_rejected() {
        assert!(Synonyms::parse("- just\n- a list\n").is_err());
    }

    #[test]
    fn missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let synonyms = Synonyms::load(&dir.path().join("synonyms.yml")).unwrap();

        assert!(synonyms.is_empty());
    }
}
