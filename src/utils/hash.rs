//! Content hashing for result fingerprints.

use xxhash_rust::xxh3::xxh3_64;

/// Compute a content hash for arbitrary bytes
pub fn content_hash(data: &[u8]) -> u64 {
    xxh3_64(data)
}

/// Render a hash the way reports print it.
pub fn format_fingerprint(hash: u64) -> String {
    format!("{hash:016x}")
}
