//! Duplicate detector: three-phase elimination pipeline.
//!
//! The expensive step (reading whole files) only ever runs on candidates
//! that survived the two cheap phases: exact-size bucketing, then a partial
//! hash of the leading bytes. Groups of fewer than 2 members are discarded
//! at every phase.

use ahash::AHashMap;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::Error;
use crate::hasher;
use crate::messages::{DupeMessage, DupePhase, DupeProgressMessage};
use crate::model::{CandidateFile, DuplicateGroup};
use crate::worker::{self, CancelToken, WorkerHandle};

/// Default candidate size window: 1 KiB to 2 GiB.
pub const DEFAULT_MIN_SIZE: u64 = 1024;
pub const DEFAULT_MAX_SIZE: u64 = 2 * 1024 * 1024 * 1024;

const PROGRESS_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy)]
pub struct DupeOptions {
    pub min_size: u64,
    pub max_size: u64,
}

impl Default for DupeOptions {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

/// Spawn a duplicate-detection worker over an already-collected file list.
pub fn spawn_find_duplicates(
    files: Vec<CandidateFile>,
    options: DupeOptions,
) -> WorkerHandle<DupeMessage> {
    worker::spawn(
        move |tx, cancel| match find_duplicates(files, &options, &tx, &cancel) {
            Ok(groups) => {
                let _ = tx.send(DupeMessage::Complete(groups));
            }
            Err(Error::Cancelled) => {}
            Err(err) => {
                let _ = tx.send(DupeMessage::Error(err.to_string()));
            }
        },
    )
}

/// Run the full pipeline and return confirmed groups sorted by descending
/// reclaimable space. Files that cannot be read during hashing silently
/// leave their candidate group: they cannot be proven identical to
/// anything.
pub fn find_duplicates(
    files: Vec<CandidateFile>,
    options: &DupeOptions,
    tx: &Sender<DupeMessage>,
    cancel: &CancelToken,
) -> Result<Vec<DuplicateGroup>, Error> {
    // Phase 1: size buckets. A file of unique size cannot have a duplicate.
    let mut by_size: AHashMap<u64, Vec<CandidateFile>> = AHashMap::new();
    for file in files {
        if file.size == 0 || file.size < options.min_size || file.size > options.max_size {
            continue;
        }
        by_size.entry(file.size).or_default().push(file);
    }
    by_size.retain(|_, bucket| bucket.len() >= 2);

    // Phase 2: partial hash re-buckets by (size, prefix digest), eliminating
    // same-size-but-different-content files with bounded I/O per file.
    let total: usize = by_size.values().map(Vec::len).sum();
    let mut progress = PhaseProgress::new(DupePhase::PartialHash, total, tx);
    let mut by_partial: AHashMap<(u64, [u8; 32]), Vec<CandidateFile>> = AHashMap::new();

    for (size, bucket) in by_size {
        for file in bucket {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let result = hasher::partial_hash(&file.path);
            progress.tick(&file.path);
            match result {
                Ok(hash) => by_partial
                    .entry((size, *hash.as_bytes()))
                    .or_default()
                    .push(file),
                Err(err) => {
                    debug!("Skipping unreadable file {}: {}", file.path.display(), err);
                }
            }
        }
    }
    by_partial.retain(|_, bucket| bucket.len() >= 2);

    // Phase 3: full-content hash confirms the survivors.
    let total: usize = by_partial.values().map(Vec::len).sum();
    let mut progress = PhaseProgress::new(DupePhase::FullHash, total, tx);
    let mut confirmed: AHashMap<(u64, [u8; 32]), Vec<CandidateFile>> = AHashMap::new();

    for ((size, _), bucket) in by_partial {
        for file in bucket {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let result = hasher::full_hash(&file.path);
            progress.tick(&file.path);
            match result {
                Ok(hash) => confirmed
                    .entry((size, *hash.as_bytes()))
                    .or_default()
                    .push(file),
                Err(err) => {
                    debug!("Skipping unreadable file {}: {}", file.path.display(), err);
                }
            }
        }
    }

    let mut groups: Vec<DuplicateGroup> = confirmed
        .into_iter()
        .filter(|(_, files)| files.len() >= 2)
        .map(|((size, digest), files)| DuplicateGroup {
            files,
            size,
            hash: blake3::Hash::from(digest).to_hex().to_string(),
        })
        .collect();

    // Highest-value cleanup opportunities first
    groups.sort_by(|a, b| b.reclaimable_bytes().cmp(&a.reclaimable_bytes()));

    Ok(groups)
}

/// Per-phase progress accounting with throttled emission.
struct PhaseProgress<'a> {
    phase: DupePhase,
    total: usize,
    done: usize,
    started: Instant,
    last_emit: Instant,
    tx: &'a Sender<DupeMessage>,
}

impl<'a> PhaseProgress<'a> {
    fn new(phase: DupePhase, total: usize, tx: &'a Sender<DupeMessage>) -> Self {
        let now = Instant::now();
        Self {
            phase,
            total,
            done: 0,
            started: now,
            last_emit: now,
            tx,
        }
    }

    fn tick(&mut self, current: &Path) {
        self.done += 1;
        if self.last_emit.elapsed() < PROGRESS_INTERVAL {
            return;
        }
        self.last_emit = Instant::now();
        let _ = self.tx.send(DupeMessage::Progress(DupeProgressMessage {
            phase: self.phase,
            files_hashed: self.done,
            total_to_hash: self.total,
            current_file: current.to_path_buf(),
            eta_secs: estimate_eta(self.started.elapsed().as_secs_f64(), self.done, self.total),
        }));
    }
}

/// Linear extrapolation from elapsed time. Undefined (reported as 0) until
/// more than 5% of the phase is done: too few samples to extrapolate from.
fn estimate_eta(elapsed_secs: f64, done: usize, total: usize) -> f64 {
    if total == 0 || done * 20 <= total {
        return 0.0;
    }
    elapsed_secs * (total - done) as f64 / done as f64
}
