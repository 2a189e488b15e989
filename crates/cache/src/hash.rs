//! Series fingerprinting.

use sha2::{Digest, Sha256};

/// Version tag on every hash; bump when the hashed representation changes.
pub const HASH_VERSION: &str = "v2";

/// Fingerprint a series: SHA-256 over the values (little-endian bytes) and
/// the length, truncated to 16 hex characters and version-tagged.
///
/// Cached records carry the hash of the series they were tuned on; a
/// changed series produces a different hash and invalidates them.
pub fn series_hash(series: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for value in series {
        hasher.update(value.to_le_bytes());
    }
    hasher.update((series.len() as u64).to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{HASH_VERSION}-{}", &digest[..16])
}
