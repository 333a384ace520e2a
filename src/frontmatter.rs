//! Front matter tag editing.
//!
//! Pure transforms over an already-parsed front matter mapping. Persisting
//! the result (to the original file or to stdout) is up to the caller; see
//! [`crate::TagService::update_file_tags`].

use serde_yaml::{Mapping, Value};

/// Reads the tag list stored under `tags_key`.
///
/// A YAML sequence yields one tag per scalar item. A plain string is treated
/// as a comma-separated list. Anything else yields no tags.
pub fn read_tags(metadata: &Mapping, tags_key: &str) -> Vec<String> {
    match metadata.get(tags_key) {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Returns a copy of `metadata` whose tags field is exactly `tags`.
///
/// # Examples
///
/// ```
/// use jtag::frontmatter::{read_tags, set_tags};
/// use serde_yaml::Mapping;
///
/// let tags = vec!["writing".to_string(), "Productivity".to_string()];
/// let updated = set_tags(&Mapping::new(), "tags", &tags);
/// assert_eq!(read_tags(&updated, "tags"), tags);
/// ```
#[must_use]
pub fn set_tags(metadata: &Mapping, tags_key: &str, tags: &[String]) -> Mapping {
    let mut updated = metadata.clone();
    let list = tags.iter().cloned().map(Value::String).collect();
    updated.insert(Value::String(tags_key.to_string()), Value::Sequence(list));
    updated
}

/// Replaces any of `targets` on the post with `merged`.
///
/// Returns the new tag list, deduplicated and sorted, or `None` when the
/// post carries none of `targets` (nothing should be rewritten).
pub fn merge_tags(
    metadata: &Mapping,
    tags_key: &str,
    targets: &[String],
    merged: &str,
) -> Option<Vec<String>> {
    let current = read_tags(metadata, tags_key);
    let (removed, mut kept): (Vec<String>, Vec<String>) =
        current.into_iter().partition(|tag| targets.contains(tag));
    if removed.is_empty() {
        return None;
    }

    kept.push(merged.to_string());
    kept.sort();
    kept.dedup();
    Some(kept)
}

/// Appends `additions` to the post's tags, skipping ones already present.
pub fn add_tags(metadata: &Mapping, tags_key: &str, additions: &[String]) -> Vec<String> {
    let mut tags = read_tags(metadata, tags_key);
    for tag in additions {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
    tags
}

/// Removes `removals` from the post's tags.
///
/// Returns `None` when none of them were present.
pub fn remove_tags(metadata: &Mapping, tags_key: &str, removals: &[String]) -> Option<Vec<String>> {
    let current = read_tags(metadata, tags_key);
    let before = current.len();
    let kept: Vec<String> = current
        .into_iter()
        .filter(|tag| !removals.contains(tag))
        .collect();

    (kept.len() != before).then_some(kept)
}

fn scalar_to_string(value: &Value) -> Option<String> {
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

    fn metadata(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn read_tags_handles_sequences_and_strings() {
        assert_eq!(
            read_tags(&metadata("tags: [rust, 2024, true]"), "tags"),
            strings(&["rust", "2024", "true"])
        );
        assert_eq!(
            read_tags(&metadata("keywords: 'mac, ios , '"), "keywords"),
            strings(&["mac", "ios"])
        );
        assert!(read_tags(&metadata("title: none"), "tags").is_empty());
        assert!(read_tags(&metadata("tags: {a: b}"), "tags").is_empty());
    }

    #[test]
    fn set_tags_round_trips_exactly() {
        let original = metadata("title: Post\ntags: [old]\nlayout: post");
        let tags = strings(&["zeta", "Alpha", "zeta", "beta"]);

        let updated = set_tags(&original, "tags", &tags);

        assert_eq!(read_tags(&updated, "tags"), tags);
        assert_eq!(updated.get("title"), original.get("title"));
        assert_eq!(updated.get("layout"), original.get("layout"));
        assert_eq!(read_tags(&original, "tags"), strings(&["old"]));
    }

    #[test]
    fn set_tags_uses_custom_key() {
        let updated = set_tags(&Mapping::new(), "keywords", &strings(&["a"]));

        assert_eq!(read_tags(&updated, "keywords"), strings(&["a"]));
        assert!(read_tags(&updated, "tags").is_empty());
    }

    #[test]
    fn merge_replaces_intersecting_tags_sorted() {
        let meta = metadata("tags: [writing, mac, macos, osx]");

        let merged = merge_tags(&meta, "tags", &strings(&["macos", "osx", "os x"]), "mac");

        assert_eq!(merged, Some(strings(&["mac", "writing"])));
    }

    #[test]
    fn merge_without_intersection_reports_none() {
        let meta = metadata("tags: [writing, productivity]");

        assert_eq!(merge_tags(&meta, "tags", &strings(&["osx"]), "mac"), None);
    }

    #[test]
    fn add_tags_skips_existing() {
        let meta = metadata("tags: [writing]");

        assert_eq!(
            add_tags(&meta, "tags", &strings(&["mac", "writing"])),
            strings(&["writing", "mac"])
        );
    }

    #[test]
    fn remove_tags_reports_when_nothing_removed() {
        let meta = metadata("tags: [writing, mac]");

        assert_eq!(remove_tags(&meta, "tags", &strings(&["mac"])), Some(strings(&["writing"])));
        assert_eq!(remove_tags(&meta, "tags", &strings(&["ios"])), None);
    }
}
