use chrono::Local;
use colored::*;
use indicatif::{HumanBytes, HumanCount};
use std::time::Duration;

use disk_scout_core::model::{DuplicateGroup, ScanOutcome, SearchResult};

const MAX_GROUPS_SHOWN: usize = 20;

pub fn print_scan_summary(outcome: &ScanOutcome, elapsed: Duration) {
    println!();
    println!(
        "Scanned {} files in {} directories, {} total, {} in {}",
        format!("{}", HumanCount(outcome.files_found)).green(),
        format!("{}", HumanCount(outcome.dirs_scanned)).green(),
        format!("{}", HumanBytes(outcome.total_size)).green(),
        errors_label(outcome.errors_count),
        format!("{:.2}s", elapsed.as_secs_f64()).green(),
    );

    println!("\n{}", "Largest files:".bold());
    for file in outcome.top_files.iter().take(10) {
        println!(
            "  {:>10}  {}",
            HumanBytes(file.size).to_string(),
            file.path.display()
        );
    }

    let mut extensions: Vec<_> = outcome.extension_stats.iter().collect();
    extensions.sort_by(|a, b| b.1.total_size.cmp(&a.1.total_size));

    println!("\n{}", "Extensions by total size:".bold());
    for (ext, stat) in extensions.iter().take(10) {
        let label = if ext.is_empty() { "(none)" } else { ext.as_str() };
        println!(
            "  {:>10}  {:>8} files  {}",
            HumanBytes(stat.total_size).to_string(),
            stat.count,
            label
        );
    }

    print_footer();
}

pub fn print_dupe_summary(groups: &[DuplicateGroup], elapsed: Duration) {
    let total_reclaimable: u64 = groups.iter().map(DuplicateGroup::reclaimable_bytes).sum();
    let dupe_files: usize = groups.iter().map(|g| g.files.len()).sum();

    println!();
    println!(
        "{} duplicate groups, {} files with duplicates, {} reclaimable in {}",
        format!("{}", groups.len()).red(),
        format!("{}", dupe_files).red(),
        format!("{}", HumanBytes(total_reclaimable)).red(),
        format!("{:.2}s", elapsed.as_secs_f64()).green(),
    );

    for group in groups.iter().take(MAX_GROUPS_SHOWN) {
        println!(
            "\n  {} × {}  ({} reclaimable)  {}",
            group.files.len(),
            HumanBytes(group.size),
            HumanBytes(group.reclaimable_bytes()),
            group.hash[..12].dimmed(),
        );
        for file in &group.files {
            println!("    {}", file.path.display());
        }
    }
    if groups.len() > MAX_GROUPS_SHOWN {
        println!("\n  ... and {} more groups", groups.len() - MAX_GROUPS_SHOWN);
    }

    print_footer();
}

pub fn format_search_result(result: &SearchResult) -> String {
    let kind = if result.is_dir { "dir " } else { "file" };
    format!(
        "  [{:.2}] {} {}",
        result.match_quality,
        kind,
        result.path.display()
    )
}

pub fn print_search_summary(dirs_scanned: u64, result_count: usize, elapsed: Duration) {
    println!();
    println!(
        "{} matches across {} directories in {}",
        format!("{result_count}").green(),
        format!("{}", HumanCount(dirs_scanned)).green(),
        format!("{:.2}s", elapsed.as_secs_f64()).green(),
    );
}

fn errors_label(errors_count: u64) -> ColoredString {
    let label = format!("{errors_count} errors");
    if errors_count > 0 {
        label.red()
    } else {
        label.normal()
    }
}

fn print_footer() {
    println!(
        "{}",
        format!("Report generated {}", Local::now().format("%Y-%m-%d %H:%M:%S")).dimmed()
    );
}
