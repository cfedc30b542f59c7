//! Content fingerprints.
//!
//! The cache never trusts origin validation tokens as identity: every cached
//! payload gets a locally computed XXH64 fingerprint of its bytes, so the
//! externally advertised entity tag is stable even when the origin's own
//! validation discipline is not. XXH64 is a fast non-cryptographic hash;
//! fingerprints are identity, not integrity.

use std::hash::Hasher;

use twox_hash::XxHash64;

/// Seed for all camrelay fingerprints. Fixed so fingerprints are stable
/// across processes and restarts.
const FINGERPRINT_SEED: u64 = 0;

/// Computes the fingerprint of a byte payload.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    XxHash64::oneshot(FINGERPRINT_SEED, bytes)
}

/// Computes the fingerprint of a byte payload, rendered as fixed-width hex.
///
/// Used for source ids (derived from the origin URL) and anywhere the
/// fingerprint travels as a string.
pub fn fingerprint_hex(bytes: &[u8]) -> String {
    format!("{:016x}", fingerprint(bytes))
}

/// Combines several string parts into one fingerprint.
///
/// Each part is length-prefixed before hashing so `["ab", "c"]` and
/// `["a", "bc"]` combine to different values.
pub fn combine<'a>(parts: impl IntoIterator<Item = &'a str>) -> u64 {
    let mut hasher = XxHash64::with_seed(FINGERPRINT_SEED);
    for part in parts {
        hasher.write(&(part.len() as u64).to_le_bytes());
        hasher.write(part.as_bytes());
    }
    hasher.finish()
}
