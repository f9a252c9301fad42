use ahash::AHashMap;
use serde::Serialize;
use std::path::PathBuf;

/// Metadata for one regular file.
///
/// Per-directory manifests store these without the full path; the path is
/// reconstructed by joining the owning directory's key with `name`. This
/// halves memory for the common case where most files never make the
/// largest-files list.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    /// Lower-cased extension including the leading dot, or empty.
    pub ext: String,
    /// Seconds since the Unix epoch, fractional.
    pub mtime: f64,
}

/// One of the N largest files of a scan, kept with its full path.
#[derive(Debug, Clone, Serialize)]
pub struct TopFile {
    pub path: PathBuf,
    pub size: u64,
    pub mtime: f64,
}

/// One visited directory. Created exactly once, when the traversal finishes
/// processing the directory, and immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryNode {
    pub path: PathBuf,
    /// Last path segment, or the path itself for roots.
    pub name: String,
    /// Total bytes under this directory: `own_size` plus all descendants.
    pub size: u64,
    /// Bytes of files directly inside this directory.
    pub own_size: u64,
    /// Immediate children counts, not recursive.
    pub file_count: usize,
    pub dir_count: usize,
    /// Subdirectory paths sorted by descending aggregated size at creation
    /// time. A snapshot, never a live view.
    pub children_paths: Vec<PathBuf>,
}

/// Running per-extension totals, keyed by lower-cased extension.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExtensionStat {
    pub count: u64,
    pub total_size: u64,
}

/// Everything a completed tree scan produces.
#[derive(Debug, Serialize)]
pub struct ScanOutcome {
    pub tree: AHashMap<PathBuf, DirectoryNode>,
    pub root: PathBuf,
    pub top_files: Vec<TopFile>,
    pub extension_stats: AHashMap<String, ExtensionStat>,
    pub dir_files: AHashMap<PathBuf, Vec<FileRecord>>,
    pub dirs_scanned: u64,
    pub files_found: u64,
    pub total_size: u64,
    pub errors_count: u64,
}

/// Duplicate-detector input: a file the caller already stat'ed.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Files confirmed byte-identical: same length, same full-content hash.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Members in traversal order. Always at least 2.
    pub files: Vec<CandidateFile>,
    pub size: u64,
    /// Lower-case hex digest of the full-content hash shared by every member.
    pub hash: String,
}

impl DuplicateGroup {
    /// Bytes freed by deleting all but one member.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.size * (self.files.len() as u64 - 1)
    }
}

/// One name match streamed out of a deep search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub path: PathBuf,
    pub dir_path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
    /// In (0, 1]; more specific (longer) matches score higher.
    pub match_quality: f64,
}

/// Flatten a scan's per-directory manifests into duplicate-detector input,
/// rebuilding each file's path from its owning directory key.
pub fn candidates_from_outcome(outcome: &ScanOutcome) -> Vec<CandidateFile> {
    let mut candidates = Vec::with_capacity(outcome.files_found as usize);
    for (dir, records) in &outcome.dir_files {
        for record in records {
            candidates.push(CandidateFile {
                path: dir.join(&record.name),
                size: record.size,
            });
        }
    }
    candidates
}
