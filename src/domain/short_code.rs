//! Short code shapes and validation.
//!
//! Three shapes are resolvable:
//!
//! - **Words** - `amber-coral-nova`: three lowercase words of 3-8 letters.
//!   Minted for every new link.
//! - **Hex** - `9f3a0c1b`: 8 lowercase hex digits. Minted only when word
//!   draws keep colliding.
//! - **Legacy** - `aB3xK9`: 6 characters from the base58 alphabet (no `0`,
//!   `O`, `I`, `l`). Still resolvable, never minted.

use regex::Regex;
use serde_json::json;
use std::fmt;
use std::sync::LazyLock;

use crate::error::AppError;

static WORD_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3,8}-[a-z]{3,8}-[a-z]{3,8}$").unwrap());

static HEX_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{8}$").unwrap());

static LEGACY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{6}$").unwrap());

/// Which format a code was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeShape {
    Words,
    Hex,
    Legacy,
}

/// A syntactically valid short code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortCode {
    value: String,
    shape: CodeShape,
}

impl ShortCode {
    /// Classifies `raw` into one of the accepted shapes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `raw` matches no shape.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let shape = if WORD_CODE_REGEX.is_match(raw) {
            CodeShape::Words
        } else if HEX_CODE_REGEX.is_match(raw) {
            CodeShape::Hex
        } else if LEGACY_CODE_REGEX.is_match(raw) {
            CodeShape::Legacy
        } else {
            return Err(AppError::bad_request(
                "Invalid short code",
                json!({
                    "hint": "expected word-word-word, 8 hex digits or a 6-character legacy code"
                }),
            ));
        };

        Ok(Self {
            value: raw.to_string(),
            shape,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn shape(&self) -> CodeShape {
        self.shape
    }

    /// Whether this code is in a shape the generator still mints.
    ///
    /// Reverse-index hits on legacy codes are treated as misses so the URL
    /// gets a fresh code.
    pub fn is_current_shape(&self) -> bool {
        !matches!(self.shape, CodeShape::Legacy)
    }

    /// Public path that redirects to this code's URL (`/s/<code>`).
    pub fn public_path(&self) -> String {
        format!("/s/{}", self.value)
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_codes() {
        let code = ShortCode::parse("amber-coral-nova").unwrap();
        assert_eq!(code.shape(), CodeShape::Words);
        assert!(code.is_current_shape());
        assert_eq!(code.public_path(), "/s/amber-coral-nova");

        assert!(ShortCode::parse("fox-owl-bay").is_ok());
        assert!(ShortCode::parse("bouldered-coral-nova").is_err());
        assert!(ShortCode::parse("amber-coral").is_err());
        assert!(ShortCode::parse("amber-coral-nova-opal").is_err());
        assert!(ShortCode::parse("Amber-coral-nova").is_err());
        assert!(ShortCode::parse("ox-coral-nova").is_err());
    }

    #[test]
    fn test_hex_codes() {
        let code = ShortCode::parse("9f3a0c1b").unwrap();
        assert_eq!(code.shape(), CodeShape::Hex);
        assert!(code.is_current_shape());

        assert!(ShortCode::parse("9F3A0C1B").is_err());
        assert!(ShortCode::parse("9f3a0c1").is_err());
    }

    #[test]
    fn test_legacy_codes() {
        let code = ShortCode::parse("aB3xK9").unwrap();
        assert_eq!(code.shape(), CodeShape::Legacy);
        assert!(!code.is_current_shape());
    }

    #[test]
    fn test_legacy_alphabet_excludes_lookalikes() {
        for bad in ["aB3xK0", "aB3xKO", "aB3xKI", "aB3xKl"] {
            assert!(ShortCode::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_codes_dedupe_in_sets() {
        let codes: std::collections::HashSet<ShortCode> =
            ["amber-coral-nova", "amber-coral-nova", "0badf00d"]
                .into_iter()
                .map(|raw| ShortCode::parse(raw).unwrap())
                .collect();
        assert_eq!(codes.len(), 2);
    }

    #[test]
    fn test_rejection_hint_names_every_shape() {
        let err = ShortCode::parse("nope").unwrap_err();
        let hint = err.to_error_info().details["hint"].as_str().unwrap().to_string();
        assert!(hint.contains("word-word-word"));
        assert!(hint.contains("8 hex digits"));
        assert!(hint.contains("legacy"));
    }

    #[test]
    fn test_rejects_path_tricks() {
        for bad in ["", "../etc", "abc def", "amber-coral-nova/", "aB3xK9?x"] {
            assert!(ShortCode::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
