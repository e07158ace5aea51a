//! Privacy helpers
//!
//! Secrets such as access tokens must never reach log output. When a log
//! line needs to tell two tokens apart it records a short SHA-256
//! fingerprint instead.

use sha2::{Digest, Sha256};

/// Hex characters kept from the digest
const FINGERPRINT_LEN: usize = 12;

/// Short, stable, non-reversible fingerprint of a secret.
///
/// Empty input yields an empty string so callers can log "no token" without
/// special-casing.
pub fn fingerprint(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }

    let digest = Sha256::digest(secret.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(FINGERPRINT_LEN);
    encoded
}
