//! Rendering tag lists for the command line.

use std::path::Path;

use clap::ValueEnum;
use serde_yaml::{Mapping, Value};

use crate::error::Result;
use crate::models::Tag;

/// Output format for tag lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A YAML mapping of the tags key to the list.
    #[default]
    Yaml,
    /// A JSON object with the tags and, for a post, its path.
    Json,
    /// One tag per line, or NUL-separated.
    List,
    /// A single comma-separated row.
    Csv,
    /// The whole post with its tags replaced.
    Complete,
}

/// Settings shared by every rendered list.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub tags_key: &'a str,
    pub path: Option<&'a Path>,
    pub print0: bool,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            tags_key: "tags",
            path: None,
            print0: false,
        }
    }
}

/// Deduplicates tags and sorts them ignoring case.
pub fn sort_tags(tags: &[String]) -> Vec<String> {
    let mut sorted = tags.to_vec();
    sorted.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    sorted.dedup();
    sorted
}

/// Renders a list of tag names.
///
/// [`OutputFormat::Complete`] needs the post text and is rendered by the
/// caller; here it falls back to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use jtag::output::{render_tags, OutputFormat, RenderOptions};
///
/// let tags = vec!["writing".to_string(), "Mac".to_string(), "mac".to_string()];
/// let csv = render_tags(&tags, OutputFormat::Csv, RenderOptions::default()).unwrap();
/// assert_eq!(csv, "Mac,mac,writing");
/// ```
pub fn render_tags(
    tags: &[String],
    format: OutputFormat,
    options: RenderOptions<'_>,
) -> Result<String> {
    let tags = sort_tags(tags);

    match format {
        OutputFormat::Yaml | OutputFormat::Complete => {
            let mut mapping = Mapping::new();
            mapping.insert(
                Value::String(options.tags_key.to_string()),
                Value::Sequence(tags.into_iter().map(Value::String).collect()),
            );
            Ok(serde_yaml::to_string(&mapping)?.trim_end().to_string())
        }
        OutputFormat::Json => {
            let mut object = serde_json::json!({ "tags": tags });
            if let Some(path) = options.path {
                object["path"] = serde_json::Value::String(path.display().to_string());
            }
            Ok(serde_json::to_string_pretty(&object)?)
        }
        OutputFormat::List => Ok(tags.join(if options.print0 { "\0" } else { "\n" })),
        OutputFormat::Csv => Ok(csv_row(&tags)),
    }
}

/// Renders corpus tags, optionally with their usage counts.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_corpus(
    tags: &[Tag],
    counts: bool,
    format: OutputFormat,
    options: RenderOptions<'_>,
) -> Result<String> {
    if !counts {
        let names: Vec<String> = tags.iter().map(|tag| tag.name().to_string()).collect();
        return render_tags(&names, format, options);
    }

    let mut tags = tags.to_vec();
    tags.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
    });
    tags.dedup_by(|a, b| a.name() == b.name());

    match format {
        OutputFormat::Yaml | OutputFormat::Complete => {
            Ok(serde_yaml::to_string(&tags)?.trim_end().to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&tags)?),
        OutputFormat::List => {
            let lines: Vec<String> = tags
                .iter()
                .map(|tag| format!("{}\t{}", tag.name(), tag.count()))
                .collect();
            Ok(lines.join(if options.print0 { "\0" } else { "\n" }))
        }
        OutputFormat::Csv => {
            let rows: Vec<String> = tags
                .iter()
                .map(|tag| format!("{},{}", csv_field(tag.name()), tag.count()))
                .collect();
            Ok(rows.join("\n"))
        }
    }
}

fn csv_row(fields: &[String]) -> String {
    fields.iter().map(|field| csv_field(field)).collect::<Vec<_>>().join(",")
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
