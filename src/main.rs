use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jtag::autotagger::SearchMode;
use jtag::corpus::{self, CorpusSource, TagOptions};
use jtag::output::{self, OutputFormat, RenderOptions};
use jtag::{Config, JTagError, TagService, config, doctor};

/// jtag - tag suggestions and tag maintenance for static blog posts
#[derive(Parser)]
#[command(name = "jtag")]
#[command(about = "Suggest and manage front matter tags for blog posts")]
#[command(version)]
struct Cli {
    /// Support directory holding config.yml and the word lists
    #[arg(short = 'c', long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Yaml)]
    format: OutputFormat,

    /// Separate list output with NUL characters
    #[arg(long, global = true)]
    print0: bool,

    /// Show debug logging
    #[arg(short = 'd', long, global = true, conflicts_with = "silent")]
    debug: bool,

    /// Only show errors
    #[arg(short = 's', long, global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Suggest tags for posts
    Tag(TagCommand),
    /// List tags in the corpus, or on the given posts
    Tags(TagsCommand),
    /// Show the tags already on posts
    PostsTags(FilesArgs),
    /// Search known tags
    Search(SearchCommand),
    /// Add tags to posts
    Add(EditCommand),
    /// Remove tags from posts
    Remove(EditCommand),
    /// Replace several tags with one across posts
    Merge(MergeCommand),
    /// Never suggest these tags
    Blacklist(TagListArgs),
    /// Allow previously blacklisted tags again
    Unblacklist(TagListArgs),
    /// Write the default support files
    Init(InitCommand),
    /// Check the support directory and tags corpus
    Doctor,
}

/// Post files; stdin or the default post location is used when empty
#[derive(Args)]
struct FilesArgs {
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct TagCommand {
    /// Write the suggested tags back into each file
    #[arg(short, long)]
    write: bool,

    #[command(flatten)]
    input: FilesArgs,
}

#[derive(Args)]
struct TagsCommand {
    /// Include usage counts
    #[arg(long)]
    counts: bool,

    /// Include blacklisted tags
    #[arg(long)]
    blacklisted: bool,

    /// Only tags used at least this many times
    #[arg(long, value_name = "N")]
    min: Option<u64>,

    /// Only tags used at most this many times
    #[arg(long, value_name = "N")]
    max: Option<u64>,

    /// Build the list from these posts instead of the tags location
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

#[derive(Args)]
struct SearchCommand {
    /// Text to look for
    #[arg(value_name = "QUERY")]
    query: String,

    /// How the query is compared with tag names
    #[arg(short, long, default_value_t = SearchMode::Contains)]
    mode: SearchMode,

    /// Compare case-sensitively
    #[arg(short = 'I', long)]
    case_sensitive: bool,
}

#[derive(Args)]
struct EditCommand {
    /// Comma-separated tags
    #[arg(value_name = "TAGS")]
    tags: String,

    #[command(flatten)]
    input: FilesArgs,
}

#[derive(Args)]
struct MergeCommand {
    /// Comma-separated tags to replace
    #[arg(value_name = "TAGS")]
    tags: String,

    /// Tag that replaces them
    #[arg(long, value_name = "TAG")]
    into: String,

    #[command(flatten)]
    input: FilesArgs,
}

#[derive(Args)]
struct TagListArgs {
    #[arg(value_name = "TAGS", required = true)]
    tags: Vec<String>,
}

#[derive(Args)]
struct InitCommand {
    /// Overwrite existing support files
    #[arg(long)]
    force: bool,
}

/// Where a command's posts come from.
#[derive(Debug, PartialEq)]
enum Input {
    Files(Vec<PathBuf>),
    Text(String),
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.silent);

    if let Err(e) = run(&cli) {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_tracing(debug: bool, silent: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if silent {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are missing inputs and empty results; everything else
/// (I/O, parsing, network) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<JTagError>())
        .is_some_and(JTagError::is_user_error)
}

fn run(cli: &Cli) -> Result<()> {
    let support_dir = config::resolve_support_dir(cli.config_dir.as_deref())?;

    match &cli.command {
        Commands::Init(cmd) => return handle_init(&support_dir, cmd.force, cli.silent),
        Commands::Doctor => return handle_doctor(&support_dir),
        _ => {}
    }

    if !config::config_files_complete(&support_dir) {
        anyhow::bail!(
            "Missing support files in {}; run `jtag init` first",
            support_dir.display()
        );
    }

    let mut service = TagService::open(&support_dir)
        .with_context(|| format!("Failed to load support files from {}", support_dir.display()))?;
    let format = cli.format;
    let print0 = cli.print0;

    match &cli.command {
        Commands::Tag(cmd) => handle_tag(&service, cmd, format, print0, cli.silent),
        Commands::Tags(cmd) => handle_tags(&service, cmd, format, print0),
        Commands::PostsTags(args) => handle_posts_tags(&service, args, format, print0),
        Commands::Search(cmd) => handle_search(&service, cmd, format, print0),
        Commands::Add(cmd) => handle_add(&service, cmd, cli.silent),
        Commands::Remove(cmd) => handle_remove(&service, cmd, cli.silent),
        Commands::Merge(cmd) => handle_merge(&service, cmd, cli.silent),
        Commands::Blacklist(args) => {
            let added = service.blacklist_tags(&args.tags)?;
            report(cli.silent, &format!("Blacklisted: {}", added.join(", ")));
            Ok(())
        }
        Commands::Unblacklist(args) => {
            let removed = service.unblacklist_tags(&args.tags)?;
            if removed.is_empty() {
                return Err(JTagError::NoMatchingTags("blacklist".to_string()).into());
            }
            report(cli.silent, &format!("Removed from blacklist: {}", removed.join(", ")));
            Ok(())
        }
        Commands::Init(_) | Commands::Doctor => Ok(()),
    }
}

fn handle_init(support_dir: &Path, force: bool, silent: bool) -> Result<()> {
    let written = config::init(support_dir, force)?;
    for path in &written {
        report(silent, &format!("Wrote {}", path.display()));
    }
    report(
        silent,
        &format!(
            "Support files are in {}. Set tags_location in config.yml to your tags file or URL.",
            support_dir.display()
        ),
    );
    Ok(())
}

fn handle_doctor(support_dir: &Path) -> Result<()> {
    let report = doctor::run_health_checks(support_dir)?;
    if report.has_errors() {
        anyhow::bail!("Health check found problems");
    }
    Ok(())
}

fn handle_tag(
    service: &TagService,
    cmd: &TagCommand,
    format: OutputFormat,
    print0: bool,
    silent: bool,
) -> Result<()> {
    let options = render_options(service.config(), print0);
    let mut found_any = false;

    match resolve_input(&cmd.input.files, read_stdin()?, service.config())? {
        Input::Text(text) => {
            let tags = output::sort_tags(&service.suggest(&text)?);
            found_any = !tags.is_empty();
            if found_any {
                if format == OutputFormat::Complete {
                    println!("{}", service.render_with_tags(&text, &tags)?);
                } else {
                    println!("{}", output::render_tags(&tags, format, options)?);
                }
            }
        }
        Input::Files(paths) => {
            let multiple = paths.len() > 1;
            for path in &paths {
                let text = jtag::utils::read_file(path)?;
                let tags = output::sort_tags(&service.suggest(&text)?);
                if tags.is_empty() {
                    tracing::warn!(path = %path.display(), "No tags found");
                    continue;
                }
                found_any = true;

                if cmd.write {
                    service.update_file_tags(path, &tags)?;
                    report(silent, &format!("Updated tags in {}", path.display()));
                } else if format == OutputFormat::Complete {
                    println!("{}", service.render_with_tags(&text, &tags)?);
                } else {
                    let file_options = RenderOptions {
                        path: Some(path.as_path()),
                        ..options
                    };
                    print_for_path(&tags, format, file_options, multiple)?;
                }
            }
        }
    }

    if !found_any {
        return Err(JTagError::NoTagsFound.into());
    }
    Ok(())
}

fn handle_tags(
    service: &TagService,
    cmd: &TagsCommand,
    format: OutputFormat,
    print0: bool,
) -> Result<()> {
    let options = TagOptions {
        blacklisted: cmd.blacklisted,
        counts: cmd.counts,
    };
    let mut tags = if cmd.files.is_empty() {
        service.tags(options)?
    } else {
        let files = existing_files(&cmd.files)?;
        service.tags_from(&CorpusSource::Posts(files), options)?
    };

    tags.retain(|tag| {
        cmd.min.is_none_or(|min| tag.count() >= min) && cmd.max.is_none_or(|max| tag.count() <= max)
    });
    if tags.is_empty() {
        return Err(JTagError::NoTagsFound.into());
    }

    let render = render_options(service.config(), print0);
    let rendered = output::render_corpus(&tags, options.counts, format, render)?;
    println!("{rendered}");
    Ok(())
}

fn handle_posts_tags(
    service: &TagService,
    args: &FilesArgs,
    format: OutputFormat,
    print0: bool,
) -> Result<()> {
    let options = render_options(service.config(), print0);
    let mut found_any = false;

    match resolve_input(&args.files, read_stdin()?, service.config())? {
        Input::Text(text) => {
            let tags = service.post_tags(&text);
            found_any = !tags.is_empty();
            if found_any {
                println!("{}", output::render_tags(&tags, format, options)?);
            }
        }
        Input::Files(paths) => {
            let multiple = paths.len() > 1;
            for path in &paths {
                let tags = service.post_tags(&jtag::utils::read_file(path)?);
                if tags.is_empty() {
                    continue;
                }
                found_any = true;
                let file_options = RenderOptions {
                    path: Some(path.as_path()),
                    ..options
                };
                print_for_path(&tags, format, file_options, multiple)?;
            }
        }
    }

    if !found_any {
        return Err(JTagError::NoTagsFound.into());
    }
    Ok(())
}

fn handle_search(
    service: &TagService,
    cmd: &SearchCommand,
    format: OutputFormat,
    print0: bool,
) -> Result<()> {
    let found = service.search(&cmd.query, cmd.mode, cmd.case_sensitive)?;
    let names: Vec<String> = found.iter().map(|tag| tag.name().to_string()).collect();
    let options = render_options(service.config(), print0);
    println!("{}", output::render_tags(&names, format, options)?);
    Ok(())
}

fn handle_add(service: &TagService, cmd: &EditCommand, silent: bool) -> Result<()> {
    let tags = parse_tags(&cmd.tags);
    for path in resolve_files(&cmd.input.files, service.config())? {
        let updated = service.add_tags(&path, &tags)?;
        report(silent, &format!("{}: {}", path.display(), updated.join(", ")));
    }
    Ok(())
}

fn handle_remove(service: &TagService, cmd: &EditCommand, silent: bool) -> Result<()> {
    let tags = parse_tags(&cmd.tags);
    let mut removed_any = false;
    for path in resolve_files(&cmd.input.files, service.config())? {
        match service.remove_tags(&path, &tags) {
            Ok(updated) => {
                removed_any = true;
                report(silent, &format!("{}: {}", path.display(), updated.join(", ")));
            }
            Err(JTagError::NoMatchingTags(_)) => {
                tracing::debug!(path = %path.display(), "No matching tags to remove");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if !removed_any {
        return Err(JTagError::NoMatchingTags(cmd.tags.clone()).into());
    }
    Ok(())
}

fn handle_merge(service: &TagService, cmd: &MergeCommand, silent: bool) -> Result<()> {
    let targets = parse_tags(&cmd.tags);
    let files = resolve_files(&cmd.input.files, service.config())?;

    let merge = service.merge_tags(&files, &targets, cmd.into.trim())?;
    for path in &merge.updated {
        report(silent, &format!("Merged tags in {}", path.display()));
    }
    if merge.updated.is_empty() {
        return Err(JTagError::NoMatchingTags(cmd.tags.clone()).into());
    }
    Ok(())
}

fn print_for_path(
    tags: &[String],
    format: OutputFormat,
    options: RenderOptions<'_>,
    multiple: bool,
) -> Result<()> {
    if multiple
        && format != OutputFormat::Json
        && let Some(path) = options.path
    {
        println!("{}:", path.display());
    }
    println!("{}", output::render_tags(tags, format, options)?);
    Ok(())
}

fn render_options(config: &Config, print0: bool) -> RenderOptions<'_> {
    RenderOptions {
        tags_key: &config.tags_key,
        path: None,
        print0,
    }
}

/// Prints a status message to stderr unless silenced.
fn report(silent: bool, message: &str) {
    if !silent {
        eprintln!("{message}");
    }
}

/// Reads piped stdin; returns `None` when stdin is a terminal.
fn read_stdin() -> Result<Option<String>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut buffer = String::new();
    stdin.read_to_string(&mut buffer).context("Failed to read stdin")?;
    Ok(Some(buffer))
}

/// Chooses the posts a command works on.
///
/// File arguments win. Otherwise piped text is used, unless it is a single
/// line naming an existing file. Otherwise the configured default post
/// location is scanned.
fn resolve_input(files: &[PathBuf], stdin: Option<String>, config: &Config) -> Result<Input> {
    if !files.is_empty() {
        return Ok(Input::Files(existing_files(files)?));
    }

    if let Some(text) = stdin
        && !text.trim().is_empty()
    {
        let trimmed = text.trim();
        if !trimmed.contains('\n') && Path::new(trimmed).is_file() {
            return Ok(Input::Files(vec![PathBuf::from(trimmed)]));
        }
        return Ok(Input::Text(text));
    }

    Ok(Input::Files(default_posts(config)?))
}

/// Like [`resolve_input`] for commands that rewrite files and cannot take
/// piped text.
fn resolve_files(files: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>> {
    if !files.is_empty() {
        return existing_files(files);
    }
    default_posts(config)
}

fn default_posts(config: &Config) -> Result<Vec<PathBuf>> {
    let Some(dir) = config.default_post_location() else {
        return Err(JTagError::NoValidFile.into());
    };
    let posts = corpus::collect_posts(&dir, &config.post_extension)?;
    if posts.is_empty() {
        return Err(JTagError::NoValidFile.into());
    }
    Ok(posts)
}

fn existing_files(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    for file in files {
        if !file.is_file() {
            return Err(JTagError::FileNotFound(file.clone()).into());
        }
    }
    Ok(files.to_vec())
}

/// Parses comma-separated tags from a string.
///
/// Splits on commas, trims whitespace from each tag, and filters out empty strings.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
