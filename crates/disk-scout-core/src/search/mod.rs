//! Deep search: an independent re-walk of a subtree, streaming name
//! matches as they are found. Does not reuse the tree scanner's output.

mod matcher;

pub use matcher::{NameMatcher, PrefixMatcher};

use lazy_static::lazy_static;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::debug;

use crate::error::Error;
use crate::messages::{SearchCompleteMessage, SearchMessage, SearchProgressMessage};
use crate::model::SearchResult;
use crate::worker::{self, CancelToken, WorkerHandle};

pub const DEFAULT_MAX_RESULTS: usize = 500;

/// Hard recursion cap bounding worst-case latency on pathological trees.
pub const MAX_DEPTH: usize = 20;

/// Directory count is a better proxy for perceived speed here than wall
/// clock, so progress is emitted per directories scanned.
const PROGRESS_EVERY_DIRS: u64 = 50;

lazy_static! {
    /// Noise directories never descended into: VCS metadata,
    /// package-manager caches, OS system and recycle directories, IDE and
    /// build caches. Dot-prefixed names are skipped separately.
    static ref SKIP_DIRS: HashSet<&'static str> = [
        ".git",
        ".svn",
        ".hg",
        "node_modules",
        "bower_components",
        "__pycache__",
        "target",
        "$RECYCLE.BIN",
        "System Volume Information",
        "Temporary Internet Files",
        "WinSxS",
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub use_regex: bool,
    pub max_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            use_regex: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

/// Spawn a search worker. The handle's channel streams one `Result` per
/// match, `Progress` every 50 directories, then `Complete` or `Error`. A
/// cancelled search sends no `Complete`.
pub fn spawn_search(
    root: PathBuf,
    query: String,
    options: SearchOptions,
) -> WorkerHandle<SearchMessage> {
    worker::spawn(
        move |tx, cancel| match search(&root, &query, &options, &tx, &cancel) {
            Ok(complete) => {
                let _ = tx.send(SearchMessage::Complete(complete));
            }
            Err(Error::Cancelled) => {}
            Err(err) => {
                let _ = tx.send(SearchMessage::Error(err.to_string()));
            }
        },
    )
}

/// Walk `root` matching entry names, streaming results over `tx`. Stops
/// early once `max_results` is reached.
pub fn search(
    root: &Path,
    query: &str,
    options: &SearchOptions,
    tx: &Sender<SearchMessage>,
    cancel: &CancelToken,
) -> Result<SearchCompleteMessage, Error> {
    let matcher = NameMatcher::compile(query, options.use_regex);

    let mut ctx = SearchContext {
        matcher,
        max_results: options.max_results,
        tx,
        cancel,
        dirs_scanned: 0,
        result_count: 0,
    };
    ctx.walk(root, 0)?;

    Ok(SearchCompleteMessage {
        dirs_scanned: ctx.dirs_scanned,
        result_count: ctx.result_count,
    })
}

struct SearchContext<'a> {
    matcher: NameMatcher,
    max_results: usize,
    tx: &'a Sender<SearchMessage>,
    cancel: &'a CancelToken,
    dirs_scanned: u64,
    result_count: usize,
}

impl SearchContext<'_> {
    fn walk(&mut self, dir: &Path, depth: usize) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(source) => {
                if depth == 0 {
                    return Err(Error::RootAccess {
                        path: dir.to_path_buf(),
                        source,
                    });
                }
                debug!("Cannot read directory {}: {}", dir.display(), source);
                return Ok(());
            }
        };

        self.dirs_scanned += 1;
        if self.dirs_scanned % PROGRESS_EVERY_DIRS == 0 {
            let _ = self.tx.send(SearchMessage::Progress(SearchProgressMessage {
                current_path: dir.to_path_buf(),
                dirs_scanned: self.dirs_scanned,
                result_count: self.result_count,
            }));
        }

        for entry_result in entries {
            if self.result_count >= self.max_results {
                return Ok(());
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Cannot read entry in {}: {}", dir.display(), err);
                    continue;
                }
            };
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    debug!("Cannot determine type of {}: {}", entry.path().display(), err);
                    continue;
                }
            };
            if file_type.is_symlink() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = file_type.is_dir();
            let path = entry.path();

            if let Some(match_quality) = self.matcher.match_quality(&name) {
                let size = if is_dir {
                    0
                } else {
                    entry.metadata().map(|m| m.len()).unwrap_or(0)
                };
                // Unbatched: every match goes out the moment it is found
                let _ = self.tx.send(SearchMessage::Result(SearchResult {
                    name: name.clone(),
                    path: path.clone(),
                    dir_path: dir.to_path_buf(),
                    size,
                    is_dir,
                    match_quality,
                }));
                self.result_count += 1;
                if self.result_count >= self.max_results {
                    return Ok(());
                }
            }

            if is_dir && depth < MAX_DEPTH && !is_skipped_dir(&name) {
                self.walk(&path, depth + 1)?;
            }
        }

        Ok(())
    }
}

fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || SKIP_DIRS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_list_covers_noise_and_hidden() {
        assert!(is_skipped_dir("node_modules"));
        assert!(is_skipped_dir("$RECYCLE.BIN"));
        assert!(is_skipped_dir(".cache"));
        assert!(is_skipped_dir(".git"));
        assert!(!is_skipped_dir("Documents"));
        assert!(!is_skipped_dir("src"));
    }
}
