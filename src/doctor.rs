//! Health check for the jtag support directory.
//!
//! Provides the `doctor` command functionality:
//! - Presence of each support file
//! - Whether the tags location resolves, and how many tags it yields
//! - Sizes of the blacklist, stopword list, and synonym table

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::TagService;
use crate::config::SUPPORT_FILES;
use crate::corpus::{CorpusSource, TagOptions};

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Health status for a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Component is healthy
    Ok,
    /// Component has a warning but is functional
    Warning(String),
    /// Component is not functional
    Error(String),
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HealthStatus::Error(_))
    }
}

/// Presence of one support file.
#[derive(Debug)]
pub struct SupportFileHealth {
    pub name: &'static str,
    pub path: PathBuf,
    pub status: HealthStatus,
}

/// Tags corpus reachability.
#[derive(Debug)]
pub struct CorpusHealth {
    pub status: HealthStatus,
    pub location: String,
    pub tag_count: usize,
    pub blacklisted_count: usize,
}

/// Support file statistics for doctor output.
#[derive(Debug)]
pub struct SupportStats {
    pub blacklist: usize,
    pub stopwords: usize,
    pub synonyms: usize,
    pub min_matches: usize,
}

/// Everything `jtag doctor` reports.
#[derive(Debug)]
pub struct DoctorReport {
    pub support_dir: PathBuf,
    pub files: Vec<SupportFileHealth>,
    pub service: HealthStatus,
    pub corpus: Option<CorpusHealth>,
    pub stats: Option<SupportStats>,
}

impl DoctorReport {
    /// Returns true if any check failed outright.
    pub fn has_errors(&self) -> bool {
        self.files.iter().any(|file| file.status.is_error())
            || self.service.is_error()
            || self.corpus.as_ref().is_some_and(|corpus| corpus.status.is_error())
    }
}

// ============================================================================
// Health Check Functions
// ============================================================================

/// Performs all health checks and prints results.
///
/// Returns the report so the caller can choose an exit status.
pub fn run_health_checks(support_dir: &Path) -> Result<DoctorReport> {
    let report = diagnose(support_dir);
    print_health_report(&report);
    Ok(report)
}

/// Runs every check without printing.
pub fn diagnose(support_dir: &Path) -> DoctorReport {
    let files = check_support_files(support_dir);

    let (service, corpus, stats) = match TagService::open(support_dir) {
        Ok(service) => {
            let stats = SupportStats {
                blacklist: service.blacklist().len(),
                stopwords: service.stopwords().len(),
                synonyms: service.synonyms().len(),
                min_matches: service.config().min_matches,
            };
            (HealthStatus::Ok, Some(check_corpus(&service)), Some(stats))
        }
        Err(e) => (HealthStatus::Error(e.to_string()), None, None),
    };

    DoctorReport {
        support_dir: support_dir.to_path_buf(),
        files,
        service,
        corpus,
        stats,
    }
}

/// Checks that each support file exists.
pub fn check_support_files(support_dir: &Path) -> Vec<SupportFileHealth> {
    SUPPORT_FILES
        .iter()
        .map(|&name| {
            let path = support_dir.join(name);
            let status = if path.is_file() {
                HealthStatus::Ok
            } else {
                HealthStatus::Error("missing (run `jtag init`)".to_string())
            };
            SupportFileHealth { name, path, status }
        })
        .collect()
}

/// Acquires the configured corpus and reports its size.
pub fn check_corpus(service: &TagService) -> CorpusHealth {
    let source = match service.corpus_source() {
        Ok(source) => source,
        Err(e) => {
            return CorpusHealth {
                status: HealthStatus::Error(e.to_string()),
                location: String::new(),
                tag_count: 0,
                blacklisted_count: 0,
            };
        }
    };

    let location = match &source {
        CorpusSource::File(path) => path.display().to_string(),
        CorpusSource::Posts(paths) => format!("{} posts", paths.len()),
        CorpusSource::Remote(url) => url.clone(),
    };

    let all = TagOptions {
        blacklisted: true,
        ..TagOptions::default()
    };
    match service.tags_from(&source, all) {
        Ok(tags) => {
            let blacklisted_count = tags
                .iter()
                .filter(|tag| service.blacklist().contains(tag.name()))
                .count();
            let status = if tags.is_empty() {
                HealthStatus::Warning("Corpus has no tags".to_string())
            } else {
                HealthStatus::Ok
            };
            CorpusHealth {
                status,
                location,
                tag_count: tags.len(),
                blacklisted_count,
            }
        }
        Err(e) => CorpusHealth {
            status: HealthStatus::Error(e.to_string()),
            location,
            tag_count: 0,
            blacklisted_count: 0,
        },
    }
}

// ============================================================================
// Pretty Printing
// ============================================================================

fn status_symbol(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "\u{2713}",
        HealthStatus::Warning(_) => "!",
        HealthStatus::Error(_) => "\u{2717}",
    }
}

fn status_color(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => GREEN,
        HealthStatus::Warning(_) => YELLOW,
        HealthStatus::Error(_) => RED,
    }
}

fn status_text(status: &HealthStatus, ok: &str) -> String {
    match status {
        HealthStatus::Ok => ok.to_string(),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    }
}

fn print_health_report(report: &DoctorReport) {
    println!("{}jtag doctor{}", BOLD, RESET);
    println!();

    // Support files section
    println!("{}Support files{}", BOLD, RESET);
    println!("    {}Directory: {}{}", DIM, report.support_dir.display(), RESET);
    for file in &report.files {
        println!(
            "  {}{}{} {}: {}",
            status_color(&file.status),
            status_symbol(&file.status),
            RESET,
            file.name,
            status_text(&file.status, "OK")
        );
    }
    println!();

    // Configuration section
    println!("{}Configuration{}", BOLD, RESET);
    println!(
        "  {}{}{} Load: {}",
        status_color(&report.service),
        status_symbol(&report.service),
        RESET,
        status_text(&report.service, "OK")
    );
    println!();

    // Corpus section
    if let Some(corpus) = &report.corpus {
        println!("{}Tags corpus{}", BOLD, RESET);
        println!(
            "  {}{}{} Status: {}",
            status_color(&corpus.status),
            status_symbol(&corpus.status),
            RESET,
            status_text(&corpus.status, "Available")
        );
        if !corpus.location.is_empty() {
            println!("    {}Location: {}{}", DIM, corpus.location, RESET);
        }
        println!();
    }

    // Statistics section
    if let Some(stats) = &report.stats {
        println!("{}Statistics{}", BOLD, RESET);
        if let Some(corpus) = &report.corpus {
            println!("  Tags:        {:>6} total", corpus.tag_count);
            println!("               {:>6} blacklisted", corpus.blacklisted_count);
        }
        println!("  Blacklist:   {:>6}", stats.blacklist);
        println!("  Stopwords:   {:>6}", stats.stopwords);
        println!("  Synonyms:    {:>6}", stats.synonyms);
        println!("  Min matches: {:>6}", stats.min_matches);
    }
}
