//! Message contracts between the worker units and their coordinator.
//!
//! Every worker reports over an mpsc channel carrying exactly one of these
//! enums; messages arrive in emission order. A cancelled worker stops
//! emitting without a `Complete`.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::model::{DuplicateGroup, ScanOutcome, SearchResult};

#[derive(Debug, Clone, Serialize)]
pub struct ScanProgressMessage {
    pub current_path: PathBuf,
    pub dirs_scanned: u64,
    pub files_found: u64,
    pub total_size: u64,
    pub errors_count: u64,
}

#[derive(Debug, Serialize)]
pub enum ScanMessage {
    Progress(ScanProgressMessage),
    Complete(Box<ScanOutcome>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DupePhase {
    PartialHash,
    FullHash,
}

impl fmt::Display for DupePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DupePhase::PartialHash => write!(f, "partial-hash"),
            DupePhase::FullHash => write!(f, "full-hash"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DupeProgressMessage {
    pub phase: DupePhase,
    pub files_hashed: usize,
    pub total_to_hash: usize,
    pub current_file: PathBuf,
    /// Estimated seconds remaining. 0 until enough of the phase is done to
    /// extrapolate from.
    pub eta_secs: f64,
}

#[derive(Debug, Serialize)]
pub enum DupeMessage {
    Progress(DupeProgressMessage),
    Complete(Vec<DuplicateGroup>),
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchProgressMessage {
    pub current_path: PathBuf,
    pub dirs_scanned: u64,
    pub result_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SearchCompleteMessage {
    pub dirs_scanned: u64,
    pub result_count: usize,
}

#[derive(Debug, Serialize)]
pub enum SearchMessage {
    /// One match, streamed as soon as it is found.
    Result(SearchResult),
    Progress(SearchProgressMessage),
    Complete(SearchCompleteMessage),
    Error(String),
}
