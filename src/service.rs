use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use crate::autotagger::{SearchMode, Suggester, Vocabulary, search_tags};
use crate::config::Config;
use crate::corpus::{self, CorpusClientBuilder, CorpusSource, TagOptions, TagsFetcher};
use crate::error::{JTagError, Result};
use crate::frontmatter;
use crate::models::{Post, Tag};
use crate::support::{BLACKLIST_FILE, Blacklist, STOPWORDS_FILE, SYNONYMS_FILE, StopWords, Synonyms};
use crate::utils::{read_file, write_atomic};

/// Outcome of merging tags across several posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Posts that were rewritten.
    pub updated: Vec<PathBuf>,
    /// Posts carrying none of the merged tags.
    pub skipped: Vec<PathBuf>,
}

/// Per-invocation tagging engine.
///
/// TagService owns the configuration, the support files, and the
/// vocabulary built from them. The vocabulary is built on first use from
/// the configured corpus and then kept for the life of the service;
/// blacklist edits made through the service are persisted but do not change
/// it.
///
/// # Examples
///
/// ```
/// use jtag::{Config, TagService};
/// use jtag::corpus::{FetchError, TagsFetcher};
/// use jtag::support::{Blacklist, StopWords, Synonyms};
///
/// struct StaticTags;
///
/// impl TagsFetcher for StaticTags {
///     fn fetch(&self, _url: &str) -> Result<String, FetchError> {
///         Ok(r#"{"tags": ["Productivity", "Conference"]}"#.to_string())
///     }
/// }
///
/// # fn main() -> jtag::Result<()> {
/// let config = Config {
///     tags_location: Some("example.com/tags.json".to_string()),
///     ..Config::default()
/// };
/// let service = TagService::from_parts(
///     config,
///     Blacklist::default(),
///     StopWords::default(),
///     Synonyms::default(),
///     Box::new(StaticTags),
/// );
///
/// let text = "Productivity at the conference. More productivity, another conference.";
/// let tags = service.suggest(text)?;
/// assert_eq!(tags, vec!["Conference", "Productivity"]);
/// # Ok(())
/// # }
/// ```
pub struct TagService {
    config: Config,
    blacklist: Blacklist,
    stopwords: StopWords,
    synonyms: Synonyms,
    fetcher: Box<dyn TagsFetcher>,
    vocabulary: OnceCell<Vocabulary>,
}

impl TagService {
    /// Loads a service from a support directory.
    ///
    /// The blacklist and stopword files must exist; a missing synonym file
    /// is an empty table. Remote corpora are fetched with a default
    /// [`crate::corpus::CorpusClient`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required support file is missing or invalid.
    pub fn open(support_dir: &Path) -> Result<Self> {
        let config = Config::load(support_dir)?;
        let blacklist = Blacklist::load(&support_dir.join(BLACKLIST_FILE))?;
        let stopwords = StopWords::load(&support_dir.join(STOPWORDS_FILE))?;
        let synonyms = Synonyms::load(&support_dir.join(SYNONYMS_FILE))?;
        let client = CorpusClientBuilder::new().build()?;

        tracing::debug!(
            dir = %support_dir.display(),
            blacklist = blacklist.len(),
            stopwords = stopwords.len(),
            synonyms = synonyms.len(),
            "Loaded support files"
        );

        Ok(Self::from_parts(
            config,
            blacklist,
            stopwords,
            synonyms,
            Box::new(client),
        ))
    }

    /// Creates a service from already-loaded parts.
    pub fn from_parts(
        config: Config,
        blacklist: Blacklist,
        stopwords: StopWords,
        synonyms: Synonyms,
        fetcher: Box<dyn TagsFetcher>,
    ) -> Self {
        Self {
            config,
            blacklist,
            stopwords,
            synonyms,
            fetcher,
            vocabulary: OnceCell::new(),
        }
    }

    /// Replaces the fetcher used for remote corpora.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Box<dyn TagsFetcher>) -> Self {
        self.fetcher = fetcher;
        self.vocabulary = OnceCell::new();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn stopwords(&self) -> &StopWords {
        &self.stopwords
    }

    pub fn synonyms(&self) -> &Synonyms {
        &self.synonyms
    }

    /// Returns the corpus source named by `tags_location`.
    ///
    /// # Errors
    ///
    /// Returns [`JTagError::Config`] if no tags location is configured.
    pub fn corpus_source(&self) -> Result<CorpusSource> {
        Ok(CorpusSource::from_location(self.config.tags_location()?))
    }

    /// Acquires the configured corpus.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be read or parsed.
    pub fn tags(&self, options: TagOptions) -> Result<Vec<Tag>> {
        self.tags_from(&self.corpus_source()?, options)
    }

    /// Acquires a corpus from an explicit source.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be read or parsed.
    pub fn tags_from(&self, source: &CorpusSource, options: TagOptions) -> Result<Vec<Tag>> {
        corpus::acquire(
            source,
            self.fetcher.as_ref(),
            &self.config.tags_key,
            &self.blacklist,
            options,
        )
    }

    /// Returns the vocabulary, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be acquired.
    pub fn vocabulary(&self) -> Result<&Vocabulary> {
        if let Some(vocabulary) = self.vocabulary.get() {
            return Ok(vocabulary);
        }

        let corpus = self.tags(TagOptions::default())?;
        let vocabulary = Vocabulary::build(&corpus, &self.blacklist, &self.synonyms);
        Ok(self.vocabulary.get_or_init(|| vocabulary))
    }

    /// Suggests tags for a post given as raw text.
    ///
    /// The title is read from the front matter and prepended to the body.
    /// Malformed front matter is treated as plain body text with no title
    /// and no existing tags. Existing tags follow the suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if the vocabulary cannot be built.
    pub fn suggest(&self, input: &str) -> Result<Vec<String>> {
        self.suggest_post(&Post::parse_lenient(input))
    }

    /// Suggests tags for an already-parsed post.
    ///
    /// # Errors
    ///
    /// Returns an error if the vocabulary cannot be built.
    pub fn suggest_post(&self, post: &Post) -> Result<Vec<String>> {
        let vocabulary = self.vocabulary()?;
        let text = match post.title() {
            Some(title) => format!("{title}\n{}", post.body()),
            None => post.body().to_string(),
        };
        let existing = post.tags(&self.config.tags_key);

        let suggester = Suggester::new(vocabulary, &self.stopwords)
            .min_matches(self.config.min_matches)
            .blacklist(&self.blacklist);
        Ok(suggester.suggest(&text, &existing))
    }

    /// Returns the tags already on a post. Malformed front matter yields no
    /// tags.
    pub fn post_tags(&self, input: &str) -> Vec<String> {
        Post::parse_lenient(input).tags(&self.config.tags_key)
    }

    /// Searches the vocabulary's tags.
    ///
    /// # Errors
    ///
    /// Returns [`JTagError::NoResults`] if nothing matches, or an error if the
    /// vocabulary cannot be built.
    pub fn search(&self, query: &str, mode: SearchMode, case_sensitive: bool) -> Result<Vec<Tag>> {
        let found = search_tags(self.vocabulary()?, query, mode, case_sensitive)?;
        Ok(found.into_iter().cloned().collect())
    }

    /// Adds `tags` to the blacklist file. Returns the entries that were new.
    ///
    /// # Errors
    ///
    /// Returns an error if the blacklist cannot be written.
    pub fn blacklist_tags(&mut self, tags: &[String]) -> Result<Vec<String>> {
        self.blacklist.add(tags)
    }

    /// Removes `tags` from the blacklist file. Returns the entries removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the blacklist cannot be written.
    pub fn unblacklist_tags(&mut self, tags: &[String]) -> Result<Vec<String>> {
        self.blacklist.remove(tags)
    }

    /// Returns `input` rendered with its tags replaced by `tags`.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter is malformed.
    pub fn render_with_tags(&self, input: &str, tags: &[String]) -> Result<String> {
        let mut post = Post::parse(input)?;
        post.set_metadata(frontmatter::set_tags(post.metadata(), &self.config.tags_key, tags));
        post.render()
    }

    /// Rewrites the tags field of the post at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written, or its front
    /// matter is malformed.
    pub fn update_file_tags(&self, path: &Path, tags: &[String]) -> Result<()> {
        let rendered = self.render_with_tags(&read_file(path)?, tags)?;
        write_atomic(path, &rendered)?;
        tracing::info!(path = %path.display(), tags = tags.len(), "Updated tags");
        Ok(())
    }

    /// Adds `tags` to the post at `path` and returns its new tag list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or written.
    pub fn add_tags(&self, path: &Path, tags: &[String]) -> Result<Vec<String>> {
        let post = Post::parse(&read_file(path)?)?;
        let updated = frontmatter::add_tags(post.metadata(), &self.config.tags_key, tags);
        self.update_file_tags(path, &updated)?;
        Ok(updated)
    }

    /// Removes `tags` from the post at `path` and returns its new tag list.
    ///
    /// # Errors
    ///
    /// Returns [`JTagError::NoMatchingTags`] if the post has none of `tags`,
    /// or an error if the file cannot be read, parsed, or written.
    pub fn remove_tags(&self, path: &Path, tags: &[String]) -> Result<Vec<String>> {
        let post = Post::parse(&read_file(path)?)?;
        let updated = frontmatter::remove_tags(post.metadata(), &self.config.tags_key, tags)
            .ok_or_else(|| JTagError::NoMatchingTags(path.display().to_string()))?;
        self.update_file_tags(path, &updated)?;
        Ok(updated)
    }

    /// Replaces any of `targets` with `merged` on each post in `paths`.
    ///
    /// Posts carrying none of `targets` are left untouched and reported as
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a post cannot be read, parsed, or written.
    pub fn merge_tags(
        &self,
        paths: &[PathBuf],
        targets: &[String],
        merged: &str,
    ) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for path in paths {
            let post = Post::parse(&read_file(path)?)?;
            match frontmatter::merge_tags(post.metadata(), &self.config.tags_key, targets, merged) {
                Some(tags) => {
                    self.update_file_tags(path, &tags)?;
                    report.updated.push(path.clone());
                }
                None => {
                    tracing::debug!(path = %path.display(), "No matching tags to merge");
                    report.skipped.push(path.clone());
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
