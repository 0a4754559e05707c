//! Link records as laid out in the link namespace.
//!
//! A link is two independent entries:
//!
//! - `code:<code>` → long URL (source of truth for resolution)
//! - `hash:<sha256(url)>` → code (reverse index used for dedup)
//!
//! `code:` is always written first. A failure between the two writes leaves
//! a resolvable but undeduplicated code; the worst outcome is a second code
//! for the same URL later on.

use super::short_code::ShortCode;

/// Store key for the forward mapping of `code`.
pub fn code_key(code: &str) -> String {
    format!("code:{code}")
}

/// Store key for the reverse-index entry of a URL digest.
pub fn hash_key(digest: &str) -> String {
    format!("hash:{digest}")
}

/// Result of a create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedLink {
    pub code: ShortCode,
    /// True when the URL already had a current-shape code.
    pub existing: bool,
}

/// Result of an update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedLink {
    pub code: ShortCode,
    /// False when the new URL equals the stored one (nothing was written).
    pub updated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(code_key("amber-coral-nova"), "code:amber-coral-nova");
        assert_eq!(hash_key("ab12"), "hash:ab12");
    }
}
