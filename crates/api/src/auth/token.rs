//! Opaque bearer-token keys.
//!
//! Keys are random strings handed to the client once, at login; only their
//! SHA-256 hex digest is stored server-side, so a database leak does not
//! compromise live sessions.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a fresh token key.
///
/// Returns a tuple of `(plaintext_key, sha256_hex_digest)`. The plaintext
/// goes into the login response; only the digest is persisted.
pub fn generate_key() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);

    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let digest = hash_key(&plaintext);
    (plaintext, digest)
}

/// Compute the SHA-256 hex digest of a token key.
///
/// Use this to compare an incoming key against the stored digest.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_matches_generated_pair() {
        let (plaintext, digest) = generate_key();
        assert_eq!(hash_key(&plaintext), digest);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn distinct_keys_per_call() {
        let (a, _) = generate_key();
        let (b, _) = generate_key();
        assert_ne!(a, b);
    }
}
