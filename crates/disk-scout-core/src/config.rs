use config::{Config, File as ConfigFile};
use glob::Pattern;
use serde::Deserialize;
use std::path::Path;
use tracing::error;

use crate::dupes;
use crate::error::Error;
use crate::scanner;
use crate::search;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Glob patterns excluded from scans and duplicate candidate collection.
    pub ignore_patterns: Vec<String>,
    /// Capacity of the scanner's largest-files list.
    pub top_files: usize,
    /// Duplicate detection size window, in bytes.
    pub min_file_size: u64,
    pub max_file_size: u64,
    /// Deep-search result cap.
    pub max_results: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            top_files: scanner::DEFAULT_TOP_FILES,
            min_file_size: dupes::DEFAULT_MIN_SIZE,
            max_file_size: dupes::DEFAULT_MAX_SIZE,
            max_results: search::DEFAULT_MAX_RESULTS,
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}

/// Compile glob ignore patterns, logging and dropping any that fail to
/// parse.
pub fn compile_ignore_patterns(globs: &[String]) -> Vec<Pattern> {
    globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

/// Remove directories that are subdirectories of other directories in the
/// list.
pub fn non_overlapping_directories(dirs: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for dir in dirs {
        let dir_path = Path::new(&dir);
        let mut should_add = true;
        let result_clone = result.clone();

        for res_dir in &result_clone {
            let res_dir_path = Path::new(res_dir);

            if dir_path.starts_with(res_dir_path) {
                should_add = false;
                break;
            }

            if res_dir_path.starts_with(dir_path) {
                result.retain(|x| x != res_dir);
                break;
            }
        }

        if should_add {
            result.push(dir);
        }
    }

    result
}
