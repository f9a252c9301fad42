//! Tree scanner: one depth-first, post-order walk of a directory tree
//! producing per-directory aggregates, a bounded largest-files list,
//! per-extension statistics and per-directory file manifests.

mod top_files;

pub use top_files::TopFiles;

use ahash::AHashMap;
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant, UNIX_EPOCH};
use tracing::debug;

use crate::error::Error;
use crate::messages::{ScanMessage, ScanProgressMessage};
use crate::model::{DirectoryNode, ExtensionStat, FileRecord, ScanOutcome, TopFile};
use crate::worker::{self, CancelToken, WorkerHandle};

pub const DEFAULT_TOP_FILES: usize = 100;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub top_files: usize,
    pub ignore_patterns: Vec<Pattern>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            top_files: DEFAULT_TOP_FILES,
            ignore_patterns: Vec::new(),
        }
    }
}

/// Spawn a scan worker for `root`. The handle's channel yields throttled
/// `Progress` messages, then one `Complete` or `Error`. A cancelled scan
/// sends neither; its partial tree is never exposed.
pub fn spawn_scan(root: PathBuf, options: ScanOptions) -> WorkerHandle<ScanMessage> {
    worker::spawn(move |tx, cancel| match scan_tree(&root, &options, &tx, &cancel) {
        Ok(outcome) => {
            let _ = tx.send(ScanMessage::Complete(Box::new(outcome)));
        }
        Err(Error::Cancelled) => {}
        Err(err) => {
            let _ = tx.send(ScanMessage::Error(err.to_string()));
        }
    })
}

/// Walk `root` once and build the full scan outcome.
///
/// Only a failure to open `root` itself is fatal. Every other inaccessible
/// entry increments `errors_count` and the traversal continues.
pub fn scan_tree(
    root: &Path,
    options: &ScanOptions,
    tx: &Sender<ScanMessage>,
    cancel: &CancelToken,
) -> Result<ScanOutcome, Error> {
    let mut ctx = ScanContext {
        options,
        tx,
        cancel,
        tree: AHashMap::new(),
        top_files: TopFiles::new(options.top_files),
        extension_stats: AHashMap::new(),
        dir_files: AHashMap::new(),
        dirs_scanned: 0,
        files_found: 0,
        total_size: 0,
        errors_count: 0,
        last_progress: Instant::now(),
    };

    ctx.scan_dir(root, 0)?;

    Ok(ScanOutcome {
        tree: ctx.tree,
        root: root.to_path_buf(),
        top_files: ctx.top_files.into_sorted_vec(),
        extension_stats: ctx.extension_stats,
        dir_files: ctx.dir_files,
        dirs_scanned: ctx.dirs_scanned,
        files_found: ctx.files_found,
        total_size: ctx.total_size,
        errors_count: ctx.errors_count,
    })
}

/// All traversal state for one scan invocation; owned by it, released with
/// it.
struct ScanContext<'a> {
    options: &'a ScanOptions,
    tx: &'a Sender<ScanMessage>,
    cancel: &'a CancelToken,
    tree: AHashMap<PathBuf, DirectoryNode>,
    top_files: TopFiles,
    extension_stats: AHashMap<String, ExtensionStat>,
    dir_files: AHashMap<PathBuf, Vec<FileRecord>>,
    dirs_scanned: u64,
    files_found: u64,
    total_size: u64,
    errors_count: u64,
    last_progress: Instant,
}

impl ScanContext<'_> {
    /// Process one directory post-order and return the total bytes under it.
    fn scan_dir(&mut self, dir: &Path, depth: usize) -> Result<u64, Error> {
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
                self.errors_count += 1;
                self.insert_node(dir, 0, 0, 0, 0, Vec::new());
                return Ok(0);
            }
        };

        let mut own_size = 0u64;
        let mut file_count = 0usize;
        let mut manifest: Vec<FileRecord> = Vec::new();
        let mut subdirs: Vec<PathBuf> = Vec::new();

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Cannot read entry in {}: {}", dir.display(), err);
                    self.errors_count += 1;
                    continue;
                }
            };

            let path = entry.path();
            if self.is_ignored(&path) {
                continue;
            }

            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    debug!("Cannot determine type of {}: {}", path.display(), err);
                    self.errors_count += 1;
                    continue;
                }
            };

            // Symlinks and junctions are never followed: cycles and
            // double-counting.
            if file_type.is_symlink() {
                continue;
            }

            if file_type.is_dir() {
                subdirs.push(path);
            } else if file_type.is_file() {
                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(err) => {
                        debug!("Cannot stat {}: {}", path.display(), err);
                        self.errors_count += 1;
                        continue;
                    }
                };

                let size = metadata.len();
                let mtime = mtime_secs(&metadata);
                let name = entry.file_name().to_string_lossy().into_owned();
                let ext = file_extension(&name);

                own_size += size;
                file_count += 1;
                self.files_found += 1;
                self.total_size += size;

                let stat = self.extension_stats.entry(ext.clone()).or_default();
                stat.count += 1;
                stat.total_size += size;

                self.top_files.accept(TopFile {
                    path,
                    size,
                    mtime,
                });
                manifest.push(FileRecord {
                    name,
                    size,
                    ext,
                    mtime,
                });

                self.maybe_emit_progress(dir);
            }
        }

        let mut children: Vec<(PathBuf, u64)> = Vec::with_capacity(subdirs.len());
        for sub in subdirs {
            let child_size = self.scan_dir(&sub, depth + 1)?;
            children.push((sub, child_size));
        }
        children.sort_by(|a, b| b.1.cmp(&a.1));

        let child_total: u64 = children.iter().map(|(_, size)| size).sum();
        let dir_count = children.len();
        let children_paths: Vec<PathBuf> = children.into_iter().map(|(path, _)| path).collect();

        if !manifest.is_empty() {
            self.dir_files.insert(dir.to_path_buf(), manifest);
        }

        let total = own_size + child_total;
        self.insert_node(dir, total, own_size, file_count, dir_count, children_paths);
        self.maybe_emit_progress(dir);

        Ok(total)
    }

    fn insert_node(
        &mut self,
        dir: &Path,
        size: u64,
        own_size: u64,
        file_count: usize,
        dir_count: usize,
        children_paths: Vec<PathBuf>,
    ) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        self.tree.insert(
            dir.to_path_buf(),
            DirectoryNode {
                path: dir.to_path_buf(),
                name,
                size,
                own_size,
                file_count,
                dir_count,
                children_paths,
            },
        );
        self.dirs_scanned += 1;
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.options
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    /// Progress is throttled to wall-clock cadence so the channel is never
    /// flooded regardless of host speed.
    fn maybe_emit_progress(&mut self, current: &Path) {
        if self.last_progress.elapsed() < PROGRESS_INTERVAL {
            return;
        }
        self.last_progress = Instant::now();
        let _ = self.tx.send(ScanMessage::Progress(ScanProgressMessage {
            current_path: current.to_path_buf(),
            dirs_scanned: self.dirs_scanned,
            files_found: self.files_found,
            total_size: self.total_size,
            errors_count: self.errors_count,
        }));
    }
}

fn mtime_secs(metadata: &fs::Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn file_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
