//! Content hashing for the reverse index.

use sha2::{Digest, Sha256};

/// Returns the lowercase hex SHA-256 digest of a URL's UTF-8 bytes.
///
/// The digest (64 chars) keys the reverse index, so arbitrarily long URLs
/// stay within store key limits and identical URLs map to one entry.
pub fn hash_url(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let a = hash_url("https://app.example/#a");
        assert_eq!(a, hash_url("https://app.example/#a"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_url(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_different_urls_differ() {
        assert_ne!(
            hash_url("https://app.example/#a"),
            hash_url("https://app.example/#b")
        );
    }
}
