//! Cryptographic utilities for invitation token hashing.

use sha2::{Digest, Sha256};

/// Number of leading token characters that may appear in logs.
pub const TOKEN_LOG_PREFIX_LEN: usize = 8;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns the log-safe prefix of a bearer token.
///
/// Never returns more than [`TOKEN_LOG_PREFIX_LEN`] characters and never
/// splits a multi-byte character.
pub fn token_prefix(token: &str) -> &str {
    match token.char_indices().nth(TOKEN_LOG_PREFIX_LEN) {
        Some((idx, _)) => &token[..idx],
        None => token,
    }
}
