mod commands;
mod logging;
mod progress;
mod report;

use std::process;
use std::time::Instant;

use anyhow::{anyhow, bail, Result};
use clap::{CommandFactory, Parser};
use commands::{Cli, Commands, DupesArgs, ScanArgs, SearchArgs};
use dotenv::dotenv;
use glob::Pattern;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use disk_scout_core::config::{self, AppConfig};
use disk_scout_core::dupes::{self, DupeOptions};
use disk_scout_core::messages::{DupeMessage, ScanMessage, SearchMessage};
use disk_scout_core::model::CandidateFile;
use disk_scout_core::scanner::{self, ScanOptions};
use disk_scout_core::search::{self, SearchOptions};

fn main() -> Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan(args)) => run_scan(&config, args),
        Some(Commands::Dupes(args)) => run_dupes(&config, args),
        Some(Commands::Search(args)) => run_search(&config, args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {config:?}");
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    }
}

fn run_scan(config: &AppConfig, args: ScanArgs) -> Result<()> {
    let options = ScanOptions {
        top_files: args.top.unwrap_or(config.top_files),
        ignore_patterns: config::compile_ignore_patterns(&config.ignore_patterns),
    };

    info!("Scanning {}", args.path.display());
    let started = Instant::now();
    let handle = scanner::spawn_scan(args.path, options);
    let reporter = progress::ScanProgressBar::new();

    let mut outcome = None;
    for message in handle.receiver() {
        match message {
            ScanMessage::Progress(p) => reporter.update(&p),
            ScanMessage::Complete(o) => outcome = Some(o),
            ScanMessage::Error(message) => {
                reporter.finish();
                bail!(message);
            }
        }
    }
    reporter.finish();

    let outcome = outcome.ok_or_else(|| anyhow!("scan produced no result"))?;
    report::print_scan_summary(&outcome, started.elapsed());
    Ok(())
}

fn run_dupes(config: &AppConfig, args: DupesArgs) -> Result<()> {
    let roots = config::non_overlapping_directories(args.paths);
    let ignore = config::compile_ignore_patterns(&config.ignore_patterns);

    info!("Collecting candidate files from {:?}", roots);
    let candidates = collect_candidates(&roots, &ignore);
    info!("{} candidate files", candidates.len());

    let options = DupeOptions {
        min_size: args.min_size.unwrap_or(config.min_file_size),
        max_size: args.max_size.unwrap_or(config.max_file_size),
    };

    let started = Instant::now();
    let handle = dupes::spawn_find_duplicates(candidates, options);
    let reporter = progress::DupeProgressBar::new();

    let mut groups = None;
    for message in handle.receiver() {
        match message {
            DupeMessage::Progress(p) => reporter.update(&p),
            DupeMessage::Complete(g) => groups = Some(g),
            DupeMessage::Error(message) => {
                reporter.finish();
                bail!(message);
            }
        }
    }
    reporter.finish();

    let groups = groups.ok_or_else(|| anyhow!("duplicate scan produced no result"))?;
    report::print_dupe_summary(&groups, started.elapsed());
    Ok(())
}

fn run_search(config: &AppConfig, args: SearchArgs) -> Result<()> {
    let options = SearchOptions {
        use_regex: args.regex,
        max_results: args.max_results.unwrap_or(config.max_results),
    };

    info!("Searching for '{}' under {}", args.query, args.path.display());
    let started = Instant::now();
    let handle = search::spawn_search(args.path, args.query, options);
    let reporter = progress::SearchProgressBar::new();

    let mut complete = None;
    for message in handle.receiver() {
        match message {
            SearchMessage::Result(result) => {
                reporter.println(report::format_search_result(&result));
            }
            SearchMessage::Progress(p) => reporter.update(&p),
            SearchMessage::Complete(c) => complete = Some(c),
            SearchMessage::Error(message) => {
                reporter.finish();
                bail!(message);
            }
        }
    }
    reporter.finish();

    let complete = complete.ok_or_else(|| anyhow!("search produced no result"))?;
    report::print_search_summary(complete.dirs_scanned, complete.result_count, started.elapsed());
    Ok(())
}

/// Flat candidate collection for the duplicate detector. Symlinks are not
/// followed; unreadable entries are skipped.
fn collect_candidates(roots: &[String], ignore: &[Pattern]) -> Vec<CandidateFile> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if ignore.iter().any(|pattern| pattern.matches_path(entry.path())) {
                continue;
            }
            match entry.metadata() {
                Ok(metadata) => files.push(CandidateFile {
                    path: entry.into_path(),
                    size: metadata.len(),
                }),
                Err(err) => {
                    debug!("Cannot stat {}: {}", entry.path().display(), err);
                }
            }
        }
    }

    files
}
