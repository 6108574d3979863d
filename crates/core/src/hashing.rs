//! SHA-256 seeding helper.
//!
//! The synthetic status source derives its RNG seed from the digest of
//! the username, so the same name always yields the same status.

use sha2::{Digest, Sha256};

/// Compute the raw SHA-256 digest of the given bytes.
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}
