use super::*;

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::corpus::FetchError;
use tempfile::tempdir;

/// Serves a fixed payload and counts fetches.
struct MockFetcher {
    payload: String,
    calls: Arc<AtomicUsize>,
}

impl TagsFetcher for MockFetcher {
    fn fetch(&self, _url: &str) -> std::result::Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

fn remote_config() -> Config {
    Config {
        tags_location: Some("example.com/tags.json".to_string()),
        ..Config::default()
    }
}

fn service_with(
    payload: &str,
    blacklist: Blacklist,
    synonyms: Synonyms,
) -> (TagService, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = MockFetcher {
        payload: payload.to_string(),
        calls: Arc::clone(&calls),
    };
    let service = TagService::from_parts(
        remote_config(),
        blacklist,
        StopWords::from_words(["about", "really", "there"]),
        synonyms,
        Box::new(fetcher),
    );
    (service, calls)
}

fn service(payload: &str) -> TagService {
    service_with(payload, Blacklist::default(), Synonyms::default()).0
}

const CORPUS: &str = r#"{"tags": ["Productivity", "Conference", "Writing", "Mac"],
  "tags_count": [{"name": "Mac", "count": 40}, {"name": "Writing", "count": 12}]}"#;

// --- Suggestion ---

#[test]
fn suggest_ranks_frequent_words_and_keeps_existing_tags() {
    let service = service(CORPUS);
    let post = "---\ntitle: Writing about writing\ntags: [blogging]\n---\n\
                I keep writing things down. Writing helps productivity.\n";

    let tags = service.suggest(post).expect("suggestion should succeed");

    assert_eq!(tags, vec!["Writing", "blogging"]);
}

#[test]
fn title_counts_toward_frequency() {
    let service = service(CORPUS);
    let with_title = "---\ntitle: Conference notes\n---\nThe conference was long.\n";
    let without_title = "---\ndate: 2024-01-01\n---\nThe conference was long.\n";

    assert_eq!(service.suggest(with_title).unwrap(), vec!["Conference"]);
    assert!(service.suggest(without_title).unwrap().is_empty());
}

#[test]
fn malformed_front_matter_is_treated_as_body() {
    let service = service(CORPUS);
    let post = "---\ntags: [unclosed\n---\nWriting and more writing.\n";

    let tags = service.suggest(post).expect("malformed front matter is recovered");

    assert_eq!(tags, vec!["Writing"]);
}

#[test]
fn vocabulary_is_built_once_per_service() {
    let (service, calls) = service_with(CORPUS, Blacklist::default(), Synonyms::default());

    service.suggest("writing writing").unwrap();
    service.suggest("conference conference").unwrap();
    service.search("mac", SearchMode::Exact, false).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1, "corpus should be fetched once");
}

#[test]
fn blacklisted_tags_are_never_suggested() {
    let blacklist = Blacklist::from_entries(["conference"]);
    let (service, _) = service_with(CORPUS, blacklist, Synonyms::default());

    let tags = service
        .suggest("conference conference conference productivity productivity")
        .unwrap();

    assert_eq!(tags, vec!["Productivity"]);
}

#[test]
fn synonyms_resolve_to_canonical_tags() {
    let synonyms = Synonyms::from_pairs([("macintosh", "Mac")]);
    let (service, _) = service_with(CORPUS, Blacklist::default(), synonyms);

    let tags = service.suggest("My macintosh. Another macintosh.").unwrap();

    assert_eq!(tags, vec!["Mac"]);
}

#[test]
fn post_tags_reads_front_matter() {
    let service = service(CORPUS);

    assert_eq!(
        service.post_tags("---\ntags:\n  - mac\n  - writing\n---\nBody\n"),
        vec!["mac", "writing"]
    );
    assert!(service.post_tags("---\ntags: [broken\n---\n").is_empty());
    assert!(service.post_tags("No front matter here").is_empty());
}

// --- Corpus and search ---

#[test]
fn tags_include_counts_and_honor_blacklist_option() {
    let blacklist = Blacklist::from_entries(["mac"]);
    let (service, _) = service_with(CORPUS, blacklist, Synonyms::default());

    let filtered = service.tags(TagOptions::default()).unwrap();
    let names: Vec<&str> = filtered.iter().map(Tag::name).collect();
    assert_eq!(names, vec!["Productivity", "Conference", "Writing"]);
    assert_eq!(filtered[2].count(), 12);

    let all = service
        .tags(TagOptions {
            blacklisted: true,
            counts: true,
        })
        .unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[3].count(), 40);
}

#[test]
fn missing_tags_location_is_reported() {
    let service = TagService::from_parts(
        Config::default(),
        Blacklist::default(),
        StopWords::default(),
        Synonyms::default(),
        Box::new(MockFetcher {
            payload: String::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }),
    );

    assert!(matches!(service.suggest("mac mac"), Err(JTagError::Config(_))));
}

#[test]
fn search_finds_tags_and_reports_no_results() {
    let service = service(CORPUS);

    let found = service.search("WRIT", SearchMode::Contains, false).unwrap();
    assert_eq!(found, vec![Tag::with_count("Writing", 12)]);

    let missing = service.search("kubernetes", SearchMode::Contains, false);
    assert!(matches!(missing, Err(JTagError::NoResults)));
}

#[test]
fn blacklist_edits_persist_but_keep_built_vocabulary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(BLACKLIST_FILE);
    fs::write(&path, "").unwrap();
    let blacklist = Blacklist::load(&path).unwrap();
    let (mut service, _) = service_with(CORPUS, blacklist, Synonyms::default());

    assert_eq!(service.suggest("writing writing").unwrap(), vec!["Writing"]);

    let added = service
        .blacklist_tags(&["Writing".to_string(), "writing".to_string()])
        .unwrap();
    assert_eq!(added, vec!["writing"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "writing\n");
    // The vocabulary built before the edit still has the tag; the suggester
    // consults the live blacklist.
    assert!(service.vocabulary().unwrap().contains_stem("write"));
    assert!(service.suggest("writing writing").unwrap().is_empty());

    let removed = service.unblacklist_tags(&["WRITING".to_string()]).unwrap();
    assert_eq!(removed, vec!["writing"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "\n");
}

// --- Editing ---

#[test]
fn update_file_tags_rewrites_front_matter_only() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    let post = "---\ntitle: Hello\ntags: [old]\n---\nBody line\n\n---\n\nMore body\n";
    fs::write(&path, post).unwrap();
    let service = service(CORPUS);

    service
        .update_file_tags(&path, &["Mac".to_string(), "Writing".to_string()])
        .unwrap();

    let post = Post::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(post.tags("tags"), vec!["Mac", "Writing"]);
    assert_eq!(post.title().as_deref(), Some("Hello"));
    assert_eq!(post.body(), "Body line\n\n---\n\nMore body\n");
}

#[test]
fn update_file_tags_refuses_malformed_front_matter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    let original = "---\n- not\n- a mapping\n---\nBody\n";
    fs::write(&path, original).unwrap();
    let service = service(CORPUS);

    let result = service.update_file_tags(&path, &["Mac".to_string()]);

    assert!(matches!(result, Err(JTagError::InvalidFrontMatter(_))));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn add_and_remove_tags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    fs::write(&path, "---\ntags: [mac]\n---\nBody\n").unwrap();
    let service = service(CORPUS);

    let added = service
        .add_tags(&path, &["writing".to_string(), "mac".to_string()])
        .unwrap();
    assert_eq!(added, vec!["mac", "writing"]);

    let removed = service.remove_tags(&path, &["mac".to_string()]).unwrap();
    assert_eq!(removed, vec!["writing"]);

    let missing = service.remove_tags(&path, &["ios".to_string()]);
    assert!(matches!(missing, Err(JTagError::NoMatchingTags(_))));
    assert_eq!(service.post_tags(&fs::read_to_string(&path).unwrap()), vec!["writing"]);
}

#[test]
fn merge_tags_across_posts() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.md");
    let second = dir.path().join("second.md");
    fs::write(&first, "---\ntags: [osx, writing, macos]\n---\nBody\n").unwrap();
    fs::write(&second, "---\ntags: [writing]\n---\nBody\n").unwrap();
    let service = service(CORPUS);

    let report = service
        .merge_tags(
            &[first.clone(), second.clone()],
            &["osx".to_string(), "macos".to_string()],
            "Mac",
        )
        .unwrap();

    assert_eq!(report.updated, vec![first.clone()]);
    assert_eq!(report.skipped, vec![second.clone()]);
    assert_eq!(service.post_tags(&fs::read_to_string(&first).unwrap()), vec!["Mac", "writing"]);
    assert_eq!(
        fs::read_to_string(&second).unwrap(),
        "---\ntags: [writing]\n---\nBody\n",
        "skipped posts are not rewritten"
    );
}

#[test]
fn render_with_tags_keeps_other_metadata() {
    let service = service(CORPUS);

    let rendered = service
        .render_with_tags("---\ntitle: Hi\n---\nBody\n", &["mac".to_string()])
        .unwrap();

    assert_eq!(rendered, "---\ntitle: Hi\ntags:\n- mac\n---\nBody\n");
}

// --- Loading from disk ---

#[test]
#[serial_test::serial]
fn open_loads_support_directory() {
    let dir = tempdir().unwrap();
    crate::config::init(dir.path(), false).unwrap();
    fs::write(dir.path().join(BLACKLIST_FILE), "conference\n").unwrap();
    let tags_file = dir.path().join("tags.yml");
    fs::write(&tags_file, "tags:\n  - Conference\n  - Writing\n").unwrap();
    fs::write(
        dir.path().join(crate::config::CONFIG_FILE),
        format!("tags_location: {}\nmin_matches: 1\n", tags_file.display()),
    )
    .unwrap();

    let service = TagService::open(dir.path()).unwrap();

    assert_eq!(service.config().min_matches, 1);
    assert_eq!(service.blacklist().len(), 1);
    assert!(!service.stopwords().is_empty());
    let names: Vec<String> = service
        .tags(TagOptions::default())
        .unwrap()
        .into_iter()
        .map(|tag| tag.name().to_string())
        .collect();
    assert_eq!(names, vec!["Writing"]);
}

#[test]
fn open_requires_blacklist_file() {
    let dir = tempdir().unwrap();
    let config_file = dir.path().join(crate::config::CONFIG_FILE);
    fs::write(config_file, "tags_location: x.com/t.json\n").unwrap();
    fs::write(dir.path().join(STOPWORDS_FILE), "the\n").unwrap();

    let result = TagService::open(dir.path());

    assert!(matches!(result, Err(JTagError::FileNotFound(_))));
}

#[test]
fn with_fetcher_replaces_remote_transport() {
    let dir = tempdir().unwrap();
    crate::config::init(dir.path(), false).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = MockFetcher {
        payload: r#"{"tags": ["Podcasting"]}"#.to_string(),
        calls: Arc::clone(&calls),
    };

    // The default config points at a remote location
    let service = TagService::open(dir.path()).unwrap().with_fetcher(Box::new(fetcher));
    let tags = service.tags(TagOptions::default()).unwrap();

    assert_eq!(tags, vec![Tag::new("Podcasting")]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
