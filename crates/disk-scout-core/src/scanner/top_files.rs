use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::model::TopFile;

/// Bounded top-K selection over a stream of files.
///
/// A fixed-capacity min-heap keyed by file size: below capacity every file
/// is kept; once full, a new file replaces the current minimum only if it
/// is strictly larger. Memory stays at O(capacity) full-path records no
/// matter how many files the scan visits, and the kept set is exactly the
/// K largest, ties broken by encounter order.
#[derive(Debug)]
pub struct TopFiles {
    capacity: usize,
    seq: u64,
    heap: BinaryHeap<HeapEntry>,
}

#[derive(Debug)]
struct HeapEntry {
    size: u64,
    seq: u64,
    file: TopFile,
}

// BinaryHeap is a max-heap, so "greatest" must mean "evict first": the
// smallest size, and among equal sizes the latest-encountered file.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .size
            .cmp(&self.size)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl TopFiles {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            seq: 0,
            heap: BinaryHeap::with_capacity(capacity + 1),
        }
    }

    /// Offer one file; it is kept only if it belongs in the current top set.
    pub fn accept(&mut self, file: TopFile) {
        let entry = HeapEntry {
            size: file.size,
            seq: self.seq,
            file,
        };
        self.seq += 1;

        if self.heap.len() < self.capacity {
            self.heap.push(entry);
            return;
        }

        if let Some(mut root) = self.heap.peek_mut() {
            // Strictly larger only: an equal size keeps the earlier file
            if entry.size > root.size {
                *root = entry;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest first; ties in encounter order.
    pub fn into_sorted_vec(self) -> Vec<TopFile> {
        let mut entries = self.heap.into_vec();
        entries.sort_by(|a, b| b.size.cmp(&a.size).then(a.seq.cmp(&b.seq)));
        entries.into_iter().map(|e| e.file).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(name: &str, size: u64) -> TopFile {
        TopFile {
            path: PathBuf::from(name),
            size,
            mtime: 0.0,
        }
    }

    #[test]
    fn test_below_capacity_keeps_everything() {
        let mut top = TopFiles::new(10);
        for i in 0..5 {
            top.accept(file(&format!("f{i}"), i * 100));
        }
        assert_eq!(top.len(), 5);
    }

    #[test]
    fn test_keeps_exactly_the_largest() {
        let mut top = TopFiles::new(3);
        let sizes = [50u64, 900, 10, 300, 700, 42, 800, 5];
        for (i, size) in sizes.iter().enumerate() {
            top.accept(file(&format!("f{i}"), *size));
        }

        let kept: Vec<u64> = top.into_sorted_vec().iter().map(|f| f.size).collect();
        assert_eq!(kept, vec![900, 800, 700]);
    }

    #[test]
    fn test_ties_keep_earlier_encounter() {
        let mut top = TopFiles::new(2);
        top.accept(file("first", 100));
        top.accept(file("second", 100));
        top.accept(file("third", 100));

        let kept = top.into_sorted_vec();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].path, PathBuf::from("first"));
        assert_eq!(kept[1].path, PathBuf::from("second"));
    }

    #[test]
    fn test_larger_file_evicts_latest_of_equal_minimums() {
        let mut top = TopFiles::new(2);
        top.accept(file("early", 5));
        top.accept(file("late", 5));
        top.accept(file("big", 7));

        let kept = top.into_sorted_vec();
        assert_eq!(kept[0].path, PathBuf::from("big"));
        assert_eq!(kept[1].path, PathBuf::from("early"));
    }

    #[test]
    fn test_matches_full_sort_on_random_stream() {
        // Deterministic pseudo-random sizes
        let mut state = 0x2545F491u64;
        let mut sizes = Vec::new();
        for _ in 0..1000 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            sizes.push(state >> 40);
        }

        let mut top = TopFiles::new(100);
        for (i, size) in sizes.iter().enumerate() {
            top.accept(file(&format!("f{i}"), *size));
        }

        let mut expected = sizes.clone();
        expected.sort_by(|a, b| b.cmp(a));
        expected.truncate(100);

        let kept: Vec<u64> = top.into_sorted_vec().iter().map(|f| f.size).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut top = TopFiles::new(0);
        top.accept(file("f", 100));
        assert!(top.is_empty());
    }
}
