//! Content hashing for the duplicate pipeline.
//!
//! Two tiers: a partial hash over a fixed-size prefix to cheaply eliminate
//! same-size-but-different-content files, then a full-content hash read in
//! fixed chunks so peak memory stays bounded regardless of file size.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Prefix length for the partial hash. Files smaller than this are hashed
/// whole in the partial phase.
pub const PARTIAL_HASH_LENGTH: u64 = 64 * 1024;

const FULL_HASH_CHUNK: usize = 128 * 1024;

/// Hash the first [`PARTIAL_HASH_LENGTH`] bytes of the file.
pub fn partial_hash(path: &Path) -> io::Result<blake3::Hash> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(PARTIAL_HASH_LENGTH as usize);
    file.take(PARTIAL_HASH_LENGTH).read_to_end(&mut buffer)?;
    Ok(blake3::hash(&buffer))
}

/// Hash the entire file content, streamed chunk by chunk.
pub fn full_hash(path: &Path) -> io::Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut chunk = vec![0u8; FULL_HASH_CHUNK];

    loop {
        let bytes_read = file.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&chunk[..bytes_read]);
    }

    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_partial_hash_ignores_bytes_past_prefix() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b.bin");

        let mut content_a = vec![0x5Au8; 80 * 1024];
        let content_b = content_a.clone();
        // Differ only past the 64 KiB prefix
        content_a[70_000] = 0xFF;

        fs::write(&a, &content_a).unwrap();
        fs::write(&b, &content_b).unwrap();

        assert_eq!(partial_hash(&a).unwrap(), partial_hash(&b).unwrap());
        assert_ne!(full_hash(&a).unwrap(), full_hash(&b).unwrap());
    }

    #[test]
    fn test_partial_hash_of_small_file_covers_whole_content() {
        let tmp = tempdir().unwrap();
        let small = tmp.path().join("small.txt");
        fs::write(&small, b"tiny content").unwrap();

        // For files under the prefix length the partial hash IS the full hash
        assert_eq!(
            partial_hash(&small).unwrap(),
            full_hash(&small).unwrap()
        );
    }

    #[test]
    fn test_full_hash_spanning_multiple_chunks() {
        let tmp = tempdir().unwrap();
        let big = tmp.path().join("big.bin");
        let content = vec![0xA1u8; 300 * 1024];
        fs::write(&big, &content).unwrap();

        assert_eq!(full_hash(&big).unwrap(), blake3::hash(&content));
    }

    #[test]
    fn test_hash_missing_file_is_io_error() {
        let tmp = tempdir().unwrap();
        let gone = tmp.path().join("nope.bin");
        assert!(partial_hash(&gone).is_err());
        assert!(full_hash(&gone).is_err());
    }
}
