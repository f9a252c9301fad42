use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "disk-scout")]
#[command(about = "Disk usage, duplicate file and deep search engine", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree and summarize usage
    Scan(ScanArgs),
    /// Find duplicate files under one or more roots
    Dupes(DupesArgs),
    /// Search file names beneath a root, fuzzy by default
    Search(SearchArgs),
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directory to scan
    pub path: PathBuf,

    /// How many of the largest files to keep
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DupesArgs {
    /// Root directories to collect candidate files from
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Minimum candidate file size in bytes
    #[arg(long)]
    pub min_size: Option<u64>,

    /// Maximum candidate file size in bytes
    #[arg(long)]
    pub max_size: Option<u64>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Root directory to search under
    pub path: PathBuf,

    /// Name query
    pub query: String,

    /// Treat the query as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Stop after this many matches
    #[arg(long)]
    pub max_results: Option<usize>,
}
