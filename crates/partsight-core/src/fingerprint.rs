//! Deterministic query fingerprints for cache and throttle keying.
//!
//! A fingerprint identifies one `(title, summary, reference)` analysis
//! query. Equal triples always hash to the same value, and each field is
//! length-prefixed before hashing so that content cannot shift across
//! field boundaries: `("ab", "c", "")` and `("a", "bc", "")` produce
//! different digests even though their concatenations are identical.

use sha2::{Digest, Sha256};

/// Compute the fingerprint for an analysis query.
///
/// Returns the hex-encoded SHA-256 digest (64 lowercase chars) over the
/// UTF-8 bytes of each field, each preceded by its byte length as a
/// little-endian u64.
pub fn query_fingerprint(title: &str, summary: &str, reference: &str) -> String {
    let mut hasher = Sha256::new();
    for field in [title, summary, reference] {
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}
