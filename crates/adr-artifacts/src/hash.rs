//! SHA-256 digests of artifact files.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{ConfigurationError, Result};

/// Lowercase hex digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Reads `path` and returns its bytes together with their digest.
pub fn read_with_digest(path: &Path) -> Result<(Vec<u8>, String)> {
    let bytes = std::fs::read(path).map_err(|e| ConfigurationError::io(path, e))?;
    let digest = sha256_hex(&bytes);
    Ok((bytes, digest))
}

/// Returns true when `value` looks like a SHA-256 hex digest.
pub fn is_sha256_hex(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_digest() {
        let digest = sha256_hex(b"");
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(is_sha256_hex(&digest));
        assert!(!is_sha256_hex("abc"));
    }
}
